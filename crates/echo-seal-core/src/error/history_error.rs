use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

/// History persistence errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Reading or writing the persisted history failed.
    #[error("History IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The persisted history could not be encoded or decoded.
    #[error("History serialization error: {source} {location}")]
    Serialization {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No artifact with the requested id exists.
    #[error("No history entry with id {id} {location}")]
    NotFound {
        /// The id that was looked up.
        id: Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}
