use crate::error::NOTICE_PERMISSION_DENIED;

use error_location::ErrorLocation;
use thiserror::Error;

/// Capture device and session errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The user or platform refused access to the microphone.
    #[error("Microphone permission denied: {reason} {location}")]
    PermissionDenied {
        /// Platform description of the refusal.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The input device could not be acquired for any other reason.
    #[error("Capture device unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Description of the acquisition failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture session is already live.
    #[error("A capture session is already active {location}")]
    SessionAlreadyActive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session ended without any captured samples.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Encoding the buffered chunks into the payload failed.
    #[error("Audio encoding failed: {reason} {location}")]
    EncodingFailed {
        /// Description of the encoder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The stream handle was read after its session was stopped.
    #[error("Capture stream already closed {location}")]
    StreamClosed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CaptureError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            CaptureError::PermissionDenied { .. } => NOTICE_PERMISSION_DENIED.to_string(),
            CaptureError::DeviceUnavailable { reason, .. } => {
                format!("Microphone unavailable: {}", reason)
            }
            CaptureError::SessionAlreadyActive { .. } => "Already recording".to_string(),
            CaptureError::NoAudioCaptured { .. } => "No audio recording found".to_string(),
            CaptureError::EncodingFailed { .. } => "Failed to encode recording".to_string(),
            CaptureError::StreamClosed { .. } => "Recording already stopped".to_string(),
        }
    }
}
