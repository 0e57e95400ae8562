//! Flat File Store
//!
//! Resident map with synchronous reads, persisted as a single snapshot file.
//!
//! ## Concurrency
//! - `data`: RwLock (many concurrent readers, exclusive editor)
//! - `generation`: bumped under the `data` write lock on every edit
//! - `disk_generation`: Mutex serializing snapshot writes; records the
//!   newest generation already on disk so stale background flushes are
//!   skipped

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::codec::EncodedValue;
use crate::config::Config;
use crate::error::Result;
use crate::queue::TaskQueue;

use super::{file, Edit, FlatStore, PrefMap};

/// Flat-file preference store
pub struct FileStore {
    /// State shared with background flush tasks
    shared: Arc<Shared>,

    /// Runs background flushes for `apply`
    flusher: TaskQueue,
}

struct Shared {
    /// Snapshot file path
    path: PathBuf,

    /// fsync before rename
    sync_writes: bool,

    /// Resident key space
    data: RwLock<PrefMap>,

    /// Edit counter
    generation: AtomicU64,

    /// Newest generation written to disk
    disk_generation: Mutex<u64>,
}

impl FileStore {
    /// Open or create the store described by `config`
    ///
    /// Loads the existing snapshot, if any. A corrupted snapshot fails with
    /// `PrefError::Corruption`.
    pub fn open(config: &Config) -> Result<Self> {
        let (path, map) = super::load_snapshot(config)?;
        let flusher = TaskQueue::new(format!("prefkv-flush-{}", config.store_name))?;

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                sync_writes: config.sync_writes,
                data: RwLock::new(map),
                generation: AtomicU64::new(0),
                disk_generation: Mutex::new(0),
            }),
            flusher,
        })
    }

    /// Block until every pending background flush has finished
    pub fn flush(&self) -> Result<()> {
        self.flusher.drain()
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.shared.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.data.read().is_empty()
    }

    /// Apply `edit` to memory and bump the generation
    fn apply_in_memory(&self, edit: Edit) {
        let mut data = self.shared.data.write();
        edit.apply_to(&mut data);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Shared {
    /// Write the current map unless a newer one is already on disk
    fn persist_latest(&self) -> Result<()> {
        let mut disk_generation = self.disk_generation.lock();

        let (generation, snapshot) = {
            let data = self.data.read();
            (self.generation.load(Ordering::SeqCst), data.clone())
        };

        if generation <= *disk_generation {
            return Ok(());
        }

        file::write_snapshot(&self.path, &snapshot, self.sync_writes)?;
        *disk_generation = generation;

        tracing::trace!(path = %self.path.display(), generation, "Snapshot written");
        Ok(())
    }
}

impl FlatStore for FileStore {
    fn get(&self, key: &str) -> Option<EncodedValue> {
        self.shared.data.read().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.shared.data.read().contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.shared.data.read().keys().cloned().collect()
    }

    fn apply(&self, edit: Edit) {
        if edit.is_empty() {
            return;
        }
        self.apply_in_memory(edit);

        let shared = Arc::clone(&self.shared);
        let queued = self.flusher.spawn(move || {
            if let Err(e) = shared.persist_latest() {
                tracing::warn!(path = %shared.path.display(), "Background flush failed: {}", e);
            }
        });

        if let Err(e) = queued {
            tracing::warn!("Could not schedule background flush: {}", e);
        }
    }

    fn commit(&self, edit: Edit) -> Result<()> {
        self.apply_in_memory(edit);
        self.shared.persist_latest()
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.shared.path)
            .field("keys", &self.len())
            .finish()
    }
}
