mod capture_error;
mod controller_error;
mod history_error;
mod service_error;
mod transition_error;

pub use {
    capture_error::CaptureError,
    controller_error::ControllerError,
    history_error::HistoryError,
    service_error::{DecodeError, SubmissionError},
    transition_error::TransitionError,
};

/// Notice shown when the microphone cannot be opened for permission reasons.
pub const NOTICE_PERMISSION_DENIED: &str = "Microphone access denied!";
/// Notice shown when the sealing or unsealing service cannot be reached.
pub const NOTICE_CONNECTION_FAILED: &str = "Connection failed. Is the backend running?";
/// Notice shown when a credential is empty or whitespace only.
pub const NOTICE_EMPTY_CREDENTIAL: &str = "Password cannot be empty";
/// Fallback notice for a sealing rejection without a structured message.
pub const NOTICE_SEAL_FAILED: &str = "Failed to create seal";
/// Fallback notice for an unsealing rejection without a structured message.
pub const NOTICE_DECODE_FAILED: &str = "Failed to decrypt";
/// Notice shown when a non-image file is offered for unsealing.
pub const NOTICE_UNSUPPORTED_FORMAT: &str = "Please upload a valid image file";

/// Result type alias using [`CaptureError`].
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Result type alias using [`HistoryError`].
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;
