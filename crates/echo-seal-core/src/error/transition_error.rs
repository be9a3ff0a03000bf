use crate::{RecordingPhase, error::NOTICE_EMPTY_CREDENTIAL};

use error_location::ErrorLocation;
use thiserror::Error;

/// Rejected state machine events.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// The event is not valid in the current phase.
    #[error("Cannot {event} while {from:?} {location}")]
    InvalidTransition {
        /// Phase the machine was in when the event arrived.
        from: RecordingPhase,
        /// Name of the rejected event.
        event: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The credential was empty or whitespace only.
    #[error("Credential is empty {location}")]
    EmptyCredential {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl TransitionError {
    /// Text shown to the user for this rejection.
    pub fn notice_text(&self) -> String {
        match self {
            TransitionError::InvalidTransition { from, event, .. } => {
                format!("Cannot {} while {}", event, from.label())
            }
            TransitionError::EmptyCredential { .. } => NOTICE_EMPTY_CREDENTIAL.to_string(),
        }
    }
}
