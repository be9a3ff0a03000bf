use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A seal image produced by the sealing service, as kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealArtifact {
    id: Uuid,
    image_reference: PathBuf,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
}

impl SealArtifact {
    /// Create an artifact record.
    pub fn new(id: Uuid, image_reference: PathBuf, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            image_reference,
            created_at,
        }
    }

    /// Unique id, used for deletion.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Where the image bytes are stored.
    pub fn image_reference(&self) -> &Path {
        &self.image_reference
    }

    /// When the sealing service answered.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
