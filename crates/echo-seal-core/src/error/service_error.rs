use crate::error::{
    HistoryError, NOTICE_CONNECTION_FAILED, NOTICE_DECODE_FAILED, NOTICE_EMPTY_CREDENTIAL,
    NOTICE_SEAL_FAILED, NOTICE_UNSUPPORTED_FORMAT,
};

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the sealing flow.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The credential was empty; nothing was sent.
    #[error("Credential is empty {location}")]
    EmptyCredential {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A submission for the same recording is still outstanding.
    #[error("Recording {session_id} is already being submitted {location}")]
    AlreadySubmitting {
        /// Session the duplicate submission belonged to.
        session_id: Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The multipart request could not be assembled.
    #[error("Failed to build sealing request: {source} {location}")]
    InvalidRequest {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The request never produced an HTTP response.
    #[error("Sealing service unreachable: {source} {location}")]
    NetworkUnreachable {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The service answered with a non-success status.
    #[error("Sealing service rejected request ({status}): {reason} {location}")]
    ServiceRejected {
        /// HTTP status code of the response.
        status: u16,
        /// Message from the structured error body, or a generic fallback.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A success response did not carry image bytes.
    #[error("Sealing service returned an invalid response: {reason} {location}")]
    InvalidResponse {
        /// Description of what was wrong with the body.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The produced seal could not be stored.
    #[error("Failed to store seal: {source} {location}")]
    StorageFailed {
        /// The underlying history error.
        #[source]
        source: HistoryError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl SubmissionError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            SubmissionError::EmptyCredential { .. } => NOTICE_EMPTY_CREDENTIAL.to_string(),
            SubmissionError::AlreadySubmitting { .. } => {
                "This recording is already being sealed".to_string()
            }
            SubmissionError::InvalidRequest { .. } => NOTICE_SEAL_FAILED.to_string(),
            SubmissionError::NetworkUnreachable { .. } => NOTICE_CONNECTION_FAILED.to_string(),
            SubmissionError::ServiceRejected { reason, .. } => reason.clone(),
            SubmissionError::InvalidResponse { .. } => {
                "Sealing service returned an unexpected response".to_string()
            }
            SubmissionError::StorageFailed { .. } => "Failed to save seal to history".to_string(),
        }
    }
}

impl From<HistoryError> for SubmissionError {
    #[track_caller]
    fn from(source: HistoryError) -> Self {
        SubmissionError::StorageFailed {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Failures of the unsealing flow.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The credential was empty; nothing was sent.
    #[error("Credential is empty {location}")]
    EmptyCredential {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The selected file is not a recognised image.
    #[error("Unsupported file format {location}")]
    UnsupportedFormat {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The multipart request could not be assembled.
    #[error("Failed to build unsealing request: {source} {location}")]
    InvalidRequest {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The request never produced an HTTP response.
    #[error("Unsealing service unreachable: {source} {location}")]
    NetworkUnreachable {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The service answered with a rejection.
    #[error("Unsealing service rejected request ({status}): {reason} {location}")]
    ServiceRejected {
        /// HTTP status code of the response.
        status: u16,
        /// Message from the structured error body, or a generic fallback.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A success response could not be parsed.
    #[error("Unsealing service returned an invalid response: {reason} {location}")]
    InvalidResponse {
        /// Description of what was wrong with the body.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl DecodeError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            DecodeError::EmptyCredential { .. } => NOTICE_EMPTY_CREDENTIAL.to_string(),
            DecodeError::UnsupportedFormat { .. } => NOTICE_UNSUPPORTED_FORMAT.to_string(),
            DecodeError::InvalidRequest { .. } => NOTICE_DECODE_FAILED.to_string(),
            DecodeError::NetworkUnreachable { .. } => NOTICE_CONNECTION_FAILED.to_string(),
            DecodeError::ServiceRejected { reason, .. } => reason.clone(),
            DecodeError::InvalidResponse { .. } => {
                "Unsealing service returned an unexpected response".to_string()
            }
        }
    }
}
