use crate::{
    HISTORY_CAPACITY, HistoryBackend, HistoryError, HistoryResult, HistoryStore, MemoryBackend,
    SealArtifact,
};

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    thread::{self, ThreadId},
};

use chrono::{Duration, Utc};
use uuid::Uuid;

fn artifact(n: i64) -> SealArtifact {
    let id = Uuid::new_v4();
    SealArtifact::new(
        id,
        PathBuf::from(format!("seals/{}.png", id)),
        Utc::now() + Duration::seconds(n),
    )
}

fn empty_store() -> HistoryStore {
    HistoryStore::open(Box::new(MemoryBackend::default())).unwrap()
}

/// WHAT: Only the ten newest artifacts survive, newest first
/// WHY: History is bounded; older seals are evicted
#[tokio::test]
async fn given_more_than_capacity_when_pushing_then_only_newest_ten_kept() {
    // Given: An empty store and 13 artifacts
    let mut store = empty_store();
    let artifacts: Vec<SealArtifact> = (0..13).map(artifact).collect();

    // When: Pushing all of them, collecting evictions
    let mut evicted = Vec::new();
    for a in &artifacts {
        evicted.extend(store.push(a.clone()).await.unwrap());
    }

    // Then: The 10 most recent remain, newest first; the 3 oldest are gone
    assert_eq!(store.len(), HISTORY_CAPACITY);
    let expected: Vec<Uuid> = artifacts.iter().rev().take(10).map(|a| a.id()).collect();
    let actual: Vec<Uuid> = store.entries().iter().map(|a| a.id()).collect();
    assert_eq!(actual, expected);

    let evicted_ids: Vec<Uuid> = evicted.iter().map(|a| a.id()).collect();
    let oldest: Vec<Uuid> = artifacts.iter().take(3).map(|a| a.id()).collect();
    assert_eq!(evicted_ids, oldest);
    for id in oldest {
        assert!(store.get(id).is_none());
    }
}

/// WHAT: Delete-by-id removes exactly that entry
/// WHY: Remaining entries must keep their relative order
#[tokio::test]
async fn given_five_entries_when_deleting_middle_then_order_of_rest_unchanged() {
    // Given: Five entries
    let mut store = empty_store();
    for n in 0..5 {
        store.push(artifact(n)).await.unwrap();
    }
    let before: Vec<Uuid> = store.entries().iter().map(|a| a.id()).collect();

    // When: Deleting the third
    let removed = store.remove(before[2]).await.unwrap();

    // Then: Only that entry is gone
    assert_eq!(removed.id(), before[2]);
    let after: Vec<Uuid> = store.entries().iter().map(|a| a.id()).collect();
    assert_eq!(after, vec![before[0], before[1], before[3], before[4]]);
}

/// WHAT: Deleting an unknown id reports NotFound
/// WHY: Stale UI selections must not silently succeed
#[tokio::test]
async fn given_unknown_id_when_deleting_then_not_found() {
    let mut store = empty_store();
    store.push(artifact(0)).await.unwrap();

    let result = store.remove(Uuid::new_v4()).await;

    assert!(matches!(result, Err(HistoryError::NotFound { .. })));
    assert_eq!(store.len(), 1);
}

/// WHAT: A failed save leaves the list unchanged
/// WHY: No partial artifact may become visible mid-insert
#[tokio::test]
async fn given_failing_backend_when_pushing_then_entries_unchanged() {
    let mut store = HistoryStore::open(Box::new(MemoryBackend::failing())).unwrap();

    let result = store.push(artifact(0)).await;

    assert!(matches!(result, Err(HistoryError::Io { .. })));
    assert!(store.is_empty());
}

/// WHAT: An oversized persisted list is truncated on open
/// WHY: Capacity holds even for files written by older builds
#[test]
fn given_oversized_persisted_list_when_opening_then_truncated_to_capacity() {
    let entries: Vec<SealArtifact> = (0..15).map(artifact).collect();
    let first = entries[0].id();

    let store = HistoryStore::open(Box::new(MemoryBackend::with_entries(entries))).unwrap();

    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.get_index(0).map(|a| a.id()), Some(first));
}

/// Records the thread each save runs on.
#[derive(Default)]
struct ThreadRecordingBackend {
    save_threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl HistoryBackend for ThreadRecordingBackend {
    fn load(&self) -> HistoryResult<Vec<SealArtifact>> {
        Ok(Vec::new())
    }

    fn save(&self, _entries: &[SealArtifact]) -> HistoryResult<()> {
        self.save_threads.lock().unwrap().push(thread::current().id());
        Ok(())
    }
}

/// WHAT: Saves run off the runtime thread
/// WHY: A blocking file write must not stall the single-threaded event loop
#[tokio::test]
async fn given_store_when_pushing_and_removing_then_saves_run_on_blocking_pool() {
    // Given: A backend that records save threads
    let backend = ThreadRecordingBackend::default();
    let save_threads = Arc::clone(&backend.save_threads);
    let mut store = HistoryStore::open(Box::new(backend)).unwrap();
    let a = artifact(0);

    // When: Pushing and removing
    store.push(a.clone()).await.unwrap();
    store.remove(a.id()).await.unwrap();

    // Then: Two saves, neither on the runtime thread
    let runtime_thread = thread::current().id();
    let threads = save_threads.lock().unwrap();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != runtime_thread));
}
