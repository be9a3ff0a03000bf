use crate::{HistoryError, HistoryResult, SealArtifact};

use std::{
    fs,
    io::{self, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::Mutex,
};

use error_location::ErrorLocation;
use tracing::debug;

/// Key the history is persisted under.
pub const STORAGE_KEY: &str = "seal_history";

/// Durable home for the history list.
///
/// Saves may block; [`HistoryStore`](crate::HistoryStore) runs them on the
/// blocking pool.
pub trait HistoryBackend: Send + Sync {
    /// Load the persisted list, newest first. Nothing persisted yet is an
    /// empty list.
    fn load(&self) -> HistoryResult<Vec<SealArtifact>>;

    /// Replace the persisted list.
    fn save(&self, entries: &[SealArtifact]) -> HistoryResult<()>;
}

/// Stores the history as a JSON array in `<dir>/seal_history.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend writing to an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend writing `<dir>/seal_history.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
    }

    /// File the history lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryBackend for JsonFileBackend {
    #[track_caller]
    fn load(&self) -> HistoryResult<Vec<SealArtifact>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HistoryError::Io {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| HistoryError::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn save(&self, entries: &[SealArtifact]) -> HistoryResult<()> {
        let caller = Location::caller();
        let io_err = |source| HistoryError::Io {
            source,
            location: ErrorLocation::from(caller),
        };

        let json =
            serde_json::to_string_pretty(entries).map_err(|source| HistoryError::Serialization {
                source,
                location: ErrorLocation::from(caller),
            })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Write-then-rename so a crash never leaves a truncated list.
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), entries = entries.len(), "History saved");
        Ok(())
    }
}

/// In-process backend, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<SealArtifact>>,
    fail_saves: bool,
}

impl MemoryBackend {
    /// Backend pre-populated with `entries`.
    pub fn with_entries(entries: Vec<SealArtifact>) -> Self {
        Self {
            entries: Mutex::new(entries),
            fail_saves: false,
        }
    }

    /// Make every subsequent save fail with an IO error.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> HistoryResult<Vec<SealArtifact>> {
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    #[track_caller]
    fn save(&self, entries: &[SealArtifact]) -> HistoryResult<()> {
        if self.fail_saves {
            return Err(HistoryError::Io {
                source: io::Error::other("storage unavailable"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        *self.entries.lock().unwrap_or_else(|e| e.into_inner()) = entries.to_vec();
        Ok(())
    }
}
