use echo_seal_core::{ControllerError, DecodeError, HistoryError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the echo-seal binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Recording workflow error from echo-seal-core.
    #[error("Recording error: {source} {location}")]
    Controller {
        /// The underlying controller error.
        #[source]
        source: ControllerError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Unsealing error from echo-seal-core.
    #[error("Unseal error: {source} {location}")]
    Decode {
        /// The underlying decode error.
        #[source]
        source: DecodeError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Seal history error from echo-seal-core.
    #[error("History error: {source} {location}")]
    History {
        /// The underlying history error.
        #[source]
        source: HistoryError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A history selector matched no stored seal.
    #[error("No seal {selector} in history {location}")]
    NoSuchSeal {
        /// The index or id the user typed.
        selector: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to read or write the clipboard.
    #[error("Clipboard error: {reason} {location}")]
    ClipboardError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            AppError::Controller { source, .. } => source.notice_text(),
            AppError::Decode { source, .. } => source.notice_text(),
            AppError::History { source, .. } => match source {
                HistoryError::NotFound { .. } => "No such seal in history".to_string(),
                _ => "Failed to update seal history".to_string(),
            },
            AppError::NoSuchSeal { selector, .. } => format!("No seal {} in history", selector),
            AppError::ClipboardError { .. } => "Clipboard unavailable".to_string(),
            AppError::ChannelSendFailed { .. } => "Internal error".to_string(),
            AppError::ConfigError { reason, .. } => reason.clone(),
            AppError::IoError { source, .. } => source.to_string(),
        }
    }
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<ControllerError> for AppError {
    #[track_caller]
    fn from(source: ControllerError) -> Self {
        AppError::Controller {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<DecodeError> for AppError {
    #[track_caller]
    fn from(source: DecodeError) -> Self {
        AppError::Decode {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<HistoryError> for AppError {
    #[track_caller]
    fn from(source: HistoryError) -> Self {
        AppError::History {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
