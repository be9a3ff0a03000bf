use crate::{HistoryBackend, HistoryError, HistoryResult, SealArtifact};

use std::{io, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Most artifacts kept; older ones are evicted.
pub const HISTORY_CAPACITY: usize = 10;

/// History shared between the sealing pipeline and the UI.
pub type SharedHistory = Arc<Mutex<HistoryStore>>;

/// Bounded, newest-first list of seal artifacts.
///
/// Every mutation is persisted before it becomes visible; a failed save
/// leaves the in-memory list unchanged.
pub struct HistoryStore {
    entries: Vec<SealArtifact>,
    backend: Arc<dyn HistoryBackend>,
}

impl HistoryStore {
    /// Load the persisted history.
    ///
    /// A corrupt file is logged and replaced by an empty list on the next
    /// save.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the backend cannot be read.
    pub fn open(backend: Box<dyn HistoryBackend>) -> HistoryResult<Self> {
        let mut entries = match backend.load() {
            Ok(entries) => entries,
            Err(HistoryError::Serialization { source, .. }) => {
                warn!(error = %source, "Stored history is unreadable; starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.truncate(HISTORY_CAPACITY);

        info!(entries = entries.len(), "History loaded");
        Ok(Self {
            entries,
            backend: Arc::from(backend),
        })
    }

    /// Wrap for sharing across tasks.
    pub fn into_shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[SealArtifact] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with `id`.
    pub fn get(&self, id: Uuid) -> Option<&SealArtifact> {
        self.entries.iter().find(|a| a.id() == id)
    }

    /// Entry at `index` (0 is newest).
    pub fn get_index(&self, index: usize) -> Option<&SealArtifact> {
        self.entries.get(index)
    }

    /// Insert `artifact` as the newest entry and persist.
    ///
    /// Returns the entries evicted to stay within [`HISTORY_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Propagates the backend's save error; the list is left as it was.
    pub async fn push(&mut self, artifact: SealArtifact) -> HistoryResult<Vec<SealArtifact>> {
        let mut next = Vec::with_capacity(HISTORY_CAPACITY + 1);
        next.push(artifact);
        next.extend(self.entries.iter().cloned());

        let evicted = if next.len() > HISTORY_CAPACITY {
            next.split_off(HISTORY_CAPACITY)
        } else {
            Vec::new()
        };

        let next = self.persist(next).await?;
        self.entries = next;
        Ok(evicted)
    }

    /// Remove the entry with `id` and persist, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::NotFound`] if no entry has `id`.
    /// - The backend's save error; the list is left as it was.
    pub async fn remove(&mut self, id: Uuid) -> HistoryResult<SealArtifact> {
        let caller = Location::caller();
        let Some(index) = self.entries.iter().position(|a| a.id() == id) else {
            return Err(HistoryError::NotFound {
                id,
                location: ErrorLocation::from(caller),
            });
        };

        let mut next = self.entries.clone();
        let removed = next.remove(index);

        let next = self.persist(next).await?;
        self.entries = next;

        info!(artifact_id = %id, "History entry deleted");
        Ok(removed)
    }

    /// Save `next` on the blocking pool and hand it back once durable.
    async fn persist(&self, next: Vec<SealArtifact>) -> HistoryResult<Vec<SealArtifact>> {
        let caller = Location::caller();
        let backend = Arc::clone(&self.backend);

        tokio::task::spawn_blocking(move || backend.save(&next).map(|()| next))
            .await
            .map_err(|e| HistoryError::Io {
                source: io::Error::other(e),
                location: ErrorLocation::from(caller),
            })?
    }
}
