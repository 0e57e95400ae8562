//! Tests for FileStore and TxStore
//!
//! These tests verify:
//! - Opening creates the data directory
//! - Apply (background) and commit (blocking) persistence
//! - Snapshots survive reopen
//! - Corrupted snapshots are rejected
//! - Subscriptions deliver the current snapshot then each transaction

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use prefkv::codec::EncodedValue;
use prefkv::store::{file, Edit, FileStore, FlatStore, TransactionalStore, TxStore};
use prefkv::{Config, PrefError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .store_name("test")
        .build()
}

fn setup_file_store() -> (TempDir, FileStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(&test_config(&temp_dir)).unwrap();
    (temp_dir, store)
}

fn setup_tx_store() -> (TempDir, TxStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = TxStore::open(&test_config(&temp_dir)).unwrap();
    (temp_dir, store)
}

// =============================================================================
// FileStore Tests
// =============================================================================

#[test]
fn test_open_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("prefs");

    let config = Config::builder().data_dir(&data_dir).build();
    let store = FileStore::open(&config).unwrap();

    assert!(data_dir.exists());
    assert!(store.is_empty());
    // Nothing is written until the first edit
    assert!(!store.path().exists());
}

#[test]
fn test_apply_is_visible_immediately() {
    let (_temp, store) = setup_file_store();

    store.apply(Edit::new().put("count", EncodedValue::Int(5)));

    assert_eq!(store.get("count"), Some(EncodedValue::Int(5)));
    assert!(store.contains("count"));
}

#[test]
fn test_apply_reaches_disk_after_flush() {
    let (_temp, store) = setup_file_store();

    store.apply(Edit::new().put("name", EncodedValue::Str("Ada".into())));
    store.flush().unwrap();

    let on_disk = file::read_snapshot(store.path()).unwrap().unwrap();
    assert_eq!(on_disk.get("name"), Some(&EncodedValue::Str("Ada".into())));
}

#[test]
fn test_commit_is_on_disk_when_it_returns() {
    let (_temp, store) = setup_file_store();

    store
        .commit(Edit::new().put("flag", EncodedValue::Bool(true)))
        .unwrap();

    let on_disk = file::read_snapshot(store.path()).unwrap().unwrap();
    assert_eq!(on_disk.get("flag"), Some(&EncodedValue::Bool(true)));
}

#[test]
fn test_file_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    {
        let store = FileStore::open(&config).unwrap();
        store.apply(Edit::new().put("a", EncodedValue::Long(1)));
        store.apply(Edit::new().put("b", EncodedValue::Long(2)).remove("a"));
        store.flush().unwrap();
    }

    let store = FileStore::open(&config).unwrap();
    assert_eq!(store.keys(), vec!["b".to_string()]);
    assert_eq!(store.get("b"), Some(EncodedValue::Long(2)));
}

#[test]
fn test_many_applies_persist_last_state() {
    let (_temp, store) = setup_file_store();

    for i in 0..100 {
        store.apply(Edit::new().put("counter", EncodedValue::Int(i)));
    }
    store.flush().unwrap();

    let on_disk = file::read_snapshot(store.path()).unwrap().unwrap();
    assert_eq!(on_disk.get("counter"), Some(&EncodedValue::Int(99)));
}

#[test]
fn test_corrupted_snapshot_fails_open() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    {
        let store = FileStore::open(&config).unwrap();
        store
            .commit(Edit::new().put("k", EncodedValue::Str("value".into())))
            .unwrap();
    }

    let path = config.snapshot_path();
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x55;
    fs::write(&path, bytes).unwrap();

    match FileStore::open(&config) {
        Err(PrefError::Corruption(_)) => {}
        other => panic!("expected corruption error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_commit_failure_is_reported() {
    let (temp_dir, store) = setup_file_store();

    // Remove the directory so the snapshot cannot be written
    fs::remove_dir_all(temp_dir.path()).unwrap();

    let result = store.commit(Edit::new().put("k", EncodedValue::Int(1)));
    assert!(matches!(result, Err(PrefError::Io(_))));

    // The in-memory edit still happened
    assert_eq!(store.get("k"), Some(EncodedValue::Int(1)));
}

#[test]
fn test_concurrent_readers_and_writer() {
    let (_temp, store) = setup_file_store();
    let store = Arc::new(store);

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..200 {
                store.apply(Edit::new().put("n", EncodedValue::Int(i)));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    if let Some(value) = store.get("n") {
                        assert!(matches!(value, EncodedValue::Int(0..=199)));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.get("n"), Some(EncodedValue::Int(199)));
}

// =============================================================================
// TxStore Tests
// =============================================================================

#[test]
fn test_subscribe_delivers_current_snapshot_first() {
    let (_temp, store) = setup_tx_store();
    store
        .update(Edit::new().put("name", EncodedValue::Str("Ada".into())))
        .unwrap();

    let rx = store.subscribe();
    let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();

    assert_eq!(first.get("name"), Some(&EncodedValue::Str("Ada".into())));
}

#[test]
fn test_subscribers_see_updates_in_order() {
    let (_temp, store) = setup_tx_store();
    let rx = store.subscribe();

    for i in 1..=3 {
        store
            .update(Edit::new().put("n", EncodedValue::Long(i)))
            .unwrap();
    }

    let seen: Vec<_> = rx
        .iter()
        .take(4)
        .map(|snapshot| snapshot.get("n").cloned())
        .collect();

    assert_eq!(
        seen,
        vec![
            None,
            Some(EncodedValue::Long(1)),
            Some(EncodedValue::Long(2)),
            Some(EncodedValue::Long(3)),
        ]
    );
}

#[test]
fn test_noop_update_is_not_published() {
    let (_temp, store) = setup_tx_store();
    store
        .update(Edit::new().put("k", EncodedValue::Int(1)))
        .unwrap();

    let rx = store.subscribe();
    rx.recv().unwrap();

    store
        .update(Edit::new().put("k", EncodedValue::Int(1)))
        .unwrap();

    assert!(rx.try_recv().is_err());
}

#[test]
fn test_dropped_subscribers_are_pruned() {
    let (_temp, store) = setup_tx_store();

    let rx = store.subscribe();
    assert_eq!(store.subscriber_count(), 1);
    drop(rx);

    store
        .update(Edit::new().put("k", EncodedValue::Int(1)))
        .unwrap();
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn test_tx_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    {
        let store = TxStore::open(&config).unwrap();
        store
            .update(Edit::new().put("theme", EncodedValue::Str("Dark".into())))
            .unwrap();
    }

    let store = TxStore::open(&config).unwrap();
    assert_eq!(
        store.snapshot().get("theme"),
        Some(&EncodedValue::Str("Dark".into()))
    );
}

#[test]
fn test_failed_update_changes_nothing() {
    let (temp_dir, store) = setup_tx_store();
    let rx = store.subscribe();
    rx.recv().unwrap();

    fs::remove_dir_all(temp_dir.path()).unwrap();

    let result = store.update(Edit::new().put("k", EncodedValue::Int(1)));
    assert!(result.is_err());
    assert!(store.snapshot().is_empty());
    assert!(rx.try_recv().is_err());
}
