use crate::{HistoryBackend, HistoryStore, JsonFileBackend, SealArtifact};

use std::{fs, path::PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

/// WHAT: History survives a restart
/// WHY: The list is read once at startup and rewritten on every mutation
#[tokio::test]
async fn given_saved_history_when_reopening_then_same_entries_loaded() {
    // Given: A store with two entries on disk
    let dir = TempDir::new().unwrap();
    let a = SealArtifact::new(Uuid::new_v4(), PathBuf::from("a.png"), Utc::now());
    let b = SealArtifact::new(Uuid::new_v4(), PathBuf::from("b.png"), Utc::now());
    {
        let mut store = HistoryStore::open(Box::new(JsonFileBackend::in_dir(dir.path()))).unwrap();
        store.push(a.clone()).await.unwrap();
        store.push(b.clone()).await.unwrap();
    }

    // When: Reopening
    let store = HistoryStore::open(Box::new(JsonFileBackend::in_dir(dir.path()))).unwrap();

    // Then: Same entries, newest first
    assert_eq!(store.entries(), &[b, a]);
}

/// WHAT: Records persist as {id, imageReference, timestamp} under the storage key
/// WHY: Keeps the on-disk layout stable
#[test]
fn given_artifact_when_saving_then_json_uses_storage_key_and_field_names() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::in_dir(dir.path());
    let artifact = SealArtifact::new(Uuid::new_v4(), PathBuf::from("x.png"), Utc::now());

    backend.save(std::slice::from_ref(&artifact)).unwrap();

    assert_eq!(backend.path(), dir.path().join("seal_history.json"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(backend.path()).unwrap()).unwrap();
    let record = &json[0];
    assert_eq!(record["id"], artifact.id().to_string());
    assert_eq!(record["imageReference"], "x.png");
    assert!(record["timestamp"].is_string());
}

/// WHAT: A missing file loads as empty history
/// WHY: First run has nothing persisted yet
#[test]
fn given_no_file_when_loading_then_empty() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::in_dir(dir.path());

    assert!(backend.load().unwrap().is_empty());
}

/// WHAT: A corrupt file opens as empty history
/// WHY: One bad write must not lock the user out of sealing
#[test]
fn given_corrupt_file_when_opening_store_then_starts_empty() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::in_dir(dir.path());
    fs::write(backend.path(), "{not json").unwrap();

    let store = HistoryStore::open(Box::new(backend)).unwrap();

    assert!(store.is_empty());
}
