use crate::{
    AudioPayload, HistoryResult, SealArtifact, SealVault, SharedHistory, SubmissionError,
    audio::{PAYLOAD_FILE_NAME, PAYLOAD_MIME},
    error::NOTICE_SEAL_FAILED,
    service::client::{AUDIO_FIELD, PASSWORD_FIELD, SEAL_PATH, ServiceClient, error_reason},
};

use std::{
    collections::HashSet,
    panic::Location,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use error_location::ErrorLocation;
use reqwest::multipart::{Form, Part};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Turns a finished recording and a credential into a stored seal.
#[derive(Clone)]
pub struct SealPipeline {
    client: ServiceClient,
    history: SharedHistory,
    vault: SealVault,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl SealPipeline {
    /// Create a pipeline storing results in `history`, images in `vault`.
    pub fn new(client: ServiceClient, history: SharedHistory, vault: SealVault) -> Self {
        Self {
            client,
            history,
            vault,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// History the pipeline appends to.
    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Send the payload to the sealing service and record the produced seal.
    ///
    /// The history insert either fully succeeds or leaves no trace: a failed
    /// insert removes the stored image again.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::EmptyCredential`] before any I/O.
    /// - [`SubmissionError::AlreadySubmitting`] while a submission for the same
    ///   session is outstanding.
    /// - [`SubmissionError::NetworkUnreachable`] on transport failure.
    /// - [`SubmissionError::ServiceRejected`] for a non-success status.
    #[instrument(skip(self, payload, credential), fields(session_id = %payload.session_id()))]
    pub async fn submit(
        &self,
        payload: AudioPayload,
        credential: &str,
    ) -> Result<SealArtifact, SubmissionError> {
        let caller = Location::caller();

        if credential.trim().is_empty() {
            return Err(SubmissionError::EmptyCredential {
                location: ErrorLocation::from(caller),
            });
        }

        let session_id = payload.session_id();
        let _guard = InFlightGuard::claim(&self.in_flight, session_id).ok_or_else(|| {
            SubmissionError::AlreadySubmitting {
                session_id,
                location: ErrorLocation::from(caller),
            }
        })?;

        let audio = Part::bytes(payload.into_bytes())
            .file_name(PAYLOAD_FILE_NAME)
            .mime_str(PAYLOAD_MIME)
            .map_err(|source| SubmissionError::InvalidRequest {
                source,
                location: ErrorLocation::from(caller),
            })?;

        let form = Form::new()
            .part(AUDIO_FIELD, audio)
            .text(PASSWORD_FIELD, credential.to_owned());

        let response = self
            .client
            .post_form(SEAL_PATH, form)
            .await
            .map_err(|source| SubmissionError::NetworkUnreachable {
                source,
                location: ErrorLocation::from(caller),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| SubmissionError::NetworkUnreachable {
                source,
                location: ErrorLocation::from(caller),
            })?;

        if !status.is_success() {
            let reason = error_reason(&body).unwrap_or_else(|| NOTICE_SEAL_FAILED.to_string());
            warn!(status = status.as_u16(), reason = %reason, "Sealing service rejected request");
            return Err(SubmissionError::ServiceRejected {
                status: status.as_u16(),
                reason,
                location: ErrorLocation::from(caller),
            });
        }

        let format = image::guess_format(&body).map_err(|e| SubmissionError::InvalidResponse {
            reason: format!("Response is not an image: {}", e),
            location: ErrorLocation::from(caller),
        })?;

        let artifact_id = Uuid::new_v4();
        let image_reference = self.vault.store(artifact_id, format, &body).await?;
        let artifact = SealArtifact::new(artifact_id, image_reference, Utc::now());

        let pushed = self.history.lock().await.push(artifact.clone()).await;
        let evicted = match pushed {
            Ok(evicted) => evicted,
            Err(e) => {
                self.vault.discard(artifact.image_reference()).await;
                return Err(e.into());
            }
        };

        for old in &evicted {
            self.vault.discard(old.image_reference()).await;
        }

        info!(
            artifact_id = %artifact.id(),
            image_bytes = body.len(),
            evicted = evicted.len(),
            "Seal created"
        );

        Ok(artifact)
    }

    /// Remove the seal with `id` from history and delete its image.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`](crate::HistoryError::NotFound) if no entry
    /// has `id`, or the history save error. The image is kept on error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> HistoryResult<SealArtifact> {
        let removed = self.history.lock().await.remove(id).await?;
        self.vault.discard(removed.image_reference()).await;

        info!(artifact_id = %id, "Seal deleted");
        Ok(removed)
    }
}

/// Marks a session's submission as outstanding until dropped.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<Uuid>>>,
    session_id: Uuid,
}

impl InFlightGuard {
    fn claim(set: &Arc<Mutex<HashSet<Uuid>>>, session_id: Uuid) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_id);

        inserted.then(|| Self {
            set: Arc::clone(set),
            session_id,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.session_id);
    }
}
