//! Transactional Store
//!
//! Copy-on-write snapshots with a single writer and push-based readers.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Subscriber
//!
//! - **Writes** (`update`): serialized by `write_lock`
//!   - clone current snapshot → apply edit → persist → publish
//!   - an edit that changes nothing is neither persisted nor published
//!
//! - **Reads** go through subscriptions. `state` is swapped and subscribers
//!   are notified while holding the `subscribers` lock, so a new subscriber
//!   sees every snapshot exactly once starting from the one current when it
//!   subscribed.
//! - One-shot reads (`first_snapshot`) copy the current snapshot and never
//!   touch the subscriber list.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::Result;

use super::{file, Edit, PrefMap, Snapshot, TransactionalStore};

/// Transactional preference store
pub struct TxStore {
    /// Snapshot file path
    path: PathBuf,

    /// fsync before rename
    sync_writes: bool,

    /// Latest committed snapshot
    state: RwLock<Snapshot>,

    /// Live subscriptions
    subscribers: Mutex<Vec<Sender<Snapshot>>>,

    /// Serializes transactions
    write_lock: Mutex<()>,
}

impl TxStore {
    /// Open or create the store described by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let (path, map) = super::load_snapshot(config)?;

        Ok(Self {
            path,
            sync_writes: config.sync_writes,
            state: RwLock::new(Arc::new(map)),
            subscribers: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
        })
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live subscriptions (dropped ones are pruned lazily)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Swap in `next` and notify every subscriber, dropping closed ones
    fn publish(&self, next: Snapshot) {
        let mut subscribers = self.subscribers.lock();
        *self.state.write() = Arc::clone(&next);

        subscribers.retain(|tx| tx.send(Arc::clone(&next)).is_ok());
    }
}

impl TransactionalStore for TxStore {
    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.state.read())
    }

    fn subscribe(&self) -> Receiver<Snapshot> {
        let (tx, rx) = channel::unbounded();

        let mut subscribers = self.subscribers.lock();
        let current = Arc::clone(&self.state.read());
        if tx.send(current).is_ok() {
            subscribers.push(tx);
        }

        rx
    }

    /// The current snapshot is always first, so no subscriber is registered
    fn first_snapshot(&self, _timeout: Duration) -> Option<Snapshot> {
        Some(self.snapshot())
    }

    fn update(&self, edit: Edit) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        let current = self.snapshot();
        let mut next = PrefMap::clone(&current);
        edit.apply_to(&mut next);

        if next == *current {
            tracing::trace!(path = %self.path.display(), "Transaction changed nothing");
            return Ok(());
        }

        // Persist first: a failed write leaves state and subscribers untouched
        file::write_snapshot(&self.path, &next, self.sync_writes)?;
        self.publish(Arc::new(next));

        Ok(())
    }
}

impl std::fmt::Debug for TxStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxStore")
            .field("path", &self.path)
            .field("keys", &self.state.read().len())
            .finish()
    }
}
