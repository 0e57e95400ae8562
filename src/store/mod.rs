//! Store Module
//!
//! The key-value stores the adapters sit on, behind two trait seams.
//!
//! ## Store Kinds
//! - [`FlatStore`]: resident in-memory map, synchronous reads, edits applied
//!   in memory at once and flushed to disk in the background ("apply") or
//!   before returning ("commit"). Implemented by [`FileStore`].
//! - [`TransactionalStore`]: reads only through subscriptions, writes as
//!   serialized transactions that persist before they are published.
//!   Implemented by [`TxStore`].
//!
//! Both persist through the snapshot format in [`file`].

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;

use crate::codec::EncodedValue;
use crate::config::Config;
use crate::error::{PrefError, Result};

pub mod file;
mod flat;
mod transactional;

pub use flat::FileStore;
pub use transactional::TxStore;

/// Every key of a store, in key order
pub type PrefMap = BTreeMap<String, EncodedValue>;

/// Immutable view of a transactional store after one transaction
pub type Snapshot = Arc<PrefMap>;

/// A single change within an [`Edit`]
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Write a value, overwriting any previous one
    Put { key: String, value: EncodedValue },

    /// Remove a key
    Remove { key: String },

    /// Remove every key
    Clear,
}

/// Batch of mutations applied atomically, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edit {
    mutations: Vec<Mutation>,
}

impl Edit {
    /// Create an empty edit
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write
    pub fn put(mut self, key: impl Into<String>, value: EncodedValue) -> Self {
        self.mutations.push(Mutation::Put {
            key: key.into(),
            value,
        });
        self
    }

    /// Queue a removal
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.mutations.push(Mutation::Remove { key: key.into() });
        self
    }

    /// Queue removal of every key
    pub fn clear(mut self) -> Self {
        self.mutations.push(Mutation::Clear);
        self
    }

    /// Queued mutations
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Apply every mutation to `map`
    pub fn apply_to(self, map: &mut PrefMap) {
        for mutation in self.mutations {
            match mutation {
                Mutation::Put { key, value } => {
                    map.insert(key, value);
                }
                Mutation::Remove { key } => {
                    map.remove(&key);
                }
                Mutation::Clear => map.clear(),
            }
        }
    }
}

/// Store with a resident snapshot and synchronous reads
pub trait FlatStore: Send + Sync {
    /// Current raw value of `key`
    fn get(&self, key: &str) -> Option<EncodedValue>;

    /// Whether `key` holds any value
    fn contains(&self, key: &str) -> bool;

    /// Every key currently held
    fn keys(&self) -> Vec<String>;

    /// Apply in memory now, persist in the background
    ///
    /// Persistence failures are logged, never reported.
    fn apply(&self, edit: Edit);

    /// Apply in memory and persist before returning
    fn commit(&self, edit: Edit) -> Result<()>;
}

/// Store read through subscriptions and written through transactions
pub trait TransactionalStore: Send + Sync {
    /// Current snapshot
    fn snapshot(&self) -> Snapshot;

    /// Open a subscription
    ///
    /// The current snapshot is delivered first, then one snapshot per
    /// committed transaction, in commit order. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> Receiver<Snapshot>;

    /// First snapshot a fresh subscription would deliver, waiting at most
    /// `timeout`
    ///
    /// Stores that can answer without registering a subscriber should
    /// override this.
    fn first_snapshot(&self, timeout: Duration) -> Option<Snapshot> {
        let receiver = self.subscribe();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => receiver.recv_deadline(deadline).ok(),
            None => receiver.recv().ok(),
        }
    }

    /// Run `edit` as one transaction
    ///
    /// Returns once the result is persisted and published. On error nothing
    /// is published and the store is unchanged.
    fn update(&self, edit: Edit) -> Result<()>;
}

/// Validate `config`, create its data directory and load any existing
/// snapshot
///
/// Returns the snapshot path and the loaded (possibly empty) map.
fn load_snapshot(config: &Config) -> Result<(PathBuf, PrefMap)> {
    let name = config.store_name.as_str();
    if name.is_empty() || name.contains(|c| c == '/' || c == '\\') || name == "." || name == ".." {
        return Err(PrefError::Config(format!("Invalid store name: {:?}", name)));
    }

    fs::create_dir_all(&config.data_dir)?;

    let path = config.snapshot_path();
    let map = file::read_snapshot(&path)?.unwrap_or_default();

    tracing::debug!(
        store = name,
        path = %path.display(),
        keys = map.len(),
        "Loaded preference snapshot"
    );

    Ok((path, map))
}
