mod artifact;
mod backend;
mod store;
mod vault;

pub use {
    artifact::SealArtifact,
    backend::{HistoryBackend, JsonFileBackend, MemoryBackend, STORAGE_KEY},
    store::{HISTORY_CAPACITY, HistoryStore, SharedHistory},
    vault::SealVault,
};
