use crate::error::{CaptureError, TransitionError};

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors returned by [`crate::SealController`] operations.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The capture device or session failed.
    #[error("Capture error: {source} {location}")]
    Capture {
        /// The underlying capture error.
        #[source]
        source: CaptureError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The state machine rejected the event.
    #[error("Transition rejected: {source} {location}")]
    Transition {
        /// The underlying transition error.
        #[source]
        source: TransitionError,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl ControllerError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            ControllerError::Capture { source, .. } => source.notice_text(),
            ControllerError::Transition { source, .. } => source.notice_text(),
        }
    }
}

// Cannot use #[from] because it does not support extra fields.
impl From<CaptureError> for ControllerError {
    #[track_caller]
    fn from(source: CaptureError) -> Self {
        ControllerError::Capture {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<TransitionError> for ControllerError {
    #[track_caller]
    fn from(source: TransitionError) -> Self {
        ControllerError::Transition {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
