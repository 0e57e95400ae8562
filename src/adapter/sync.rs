//! Synchronous Store Adapter
//!
//! Typed get/set over a [`FlatStore`]. Reads come straight from the resident
//! map; writes are applied in memory at once and persisted in the
//! background, unless the `_now` variants are used.

use std::sync::Arc;

use crate::codec::{self, PrefCodec};
use crate::error::Result;
use crate::key::Key;
use crate::store::{Edit, FileStore, FlatStore};

/// Typed preferences over a flat store
pub struct SyncPrefs<S = FileStore> {
    store: Arc<S>,
}

impl<S> Clone for SyncPrefs<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: FlatStore> SyncPrefs<S> {
    /// Wrap an already opened store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Value of `key`, or `default` if missing or undecodable
    pub fn get<T: PrefCodec>(&self, key: &Key<T>, default: T) -> T {
        codec::decode_or(key.name(), self.store.get(key.name()).as_ref(), default)
    }

    /// Value of `key`, or `None` if missing or undecodable
    pub fn get_opt<T: PrefCodec>(&self, key: &Key<T>) -> Option<T> {
        codec::decode_opt(key.name(), self.store.get(key.name()).as_ref())
    }

    /// Whether any value is stored under `name`, regardless of type
    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// Every stored key name
    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key` (`None` removes it), persisting in the
    /// background
    pub fn set<T: PrefCodec>(&self, key: &Key<T>, value: impl Into<Option<T>>) {
        self.store.apply(super::write_edit(key, value.into()));
    }

    /// Store `value` under `key` (`None` removes it) and persist before
    /// returning
    pub fn set_now<T: PrefCodec>(&self, key: &Key<T>, value: impl Into<Option<T>>) -> Result<()> {
        self.store.commit(super::write_edit(key, value.into()))
    }

    /// Remove `key`, persisting in the background
    pub fn remove<T>(&self, key: &Key<T>) {
        self.store.apply(Edit::new().remove(key.name()));
    }

    /// Remove every key and persist before returning
    pub fn clear_all(&self) -> Result<()> {
        tracing::debug!("Clearing all preferences");
        self.store.commit(Edit::new().clear())
    }
}
