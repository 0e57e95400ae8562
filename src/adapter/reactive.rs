//! Asynchronous Store Adapter
//!
//! Typed access to a [`TransactionalStore`], whose only read path is a
//! subscription.
//!
//! ## Operations
//! - `read_flow`: cold, restartable [`Flow`]; each `subscribe()` yields the
//!   current value then one value per change to the key
//! - `read_blocking`: first value a fresh subscription would deliver, bounded
//!   by the read timeout; timeouts degrade to the default
//! - `write` / `clear_all`: block until the transaction is persisted
//! - `write_async`: queue the transaction on the adapter's [`TaskQueue`] and
//!   return; outcomes are logged, never reported
//!
//! Timeouts, missing keys and decode failures are indistinguishable to the
//! caller of `read_blocking`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, TryRecvError};

use crate::codec::{self, EncodedValue, PrefCodec};
use crate::config::{Config, DEFAULT_READ_TIMEOUT};
use crate::error::Result;
use crate::key::Key;
use crate::queue::TaskQueue;
use crate::store::{Edit, Snapshot, TransactionalStore, TxStore};

type Decoder<V> = Arc<dyn Fn(Option<&EncodedValue>) -> V + Send + Sync>;

/// Typed preferences over a transactional store
pub struct AsyncPrefs<S = TxStore> {
    /// Shared store handle
    store: Arc<S>,

    /// Executor for `write_async`
    queue: TaskQueue,

    /// Bound on `read_blocking`
    read_timeout: Duration,
}

impl<S> Clone for AsyncPrefs<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            queue: self.queue.clone(),
            read_timeout: self.read_timeout,
        }
    }
}

impl<S: TransactionalStore + 'static> AsyncPrefs<S> {
    /// Wrap an opened store, using `queue` for fire-and-forget writes
    pub fn new(store: Arc<S>, queue: TaskQueue) -> Self {
        Self {
            store,
            queue,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Like [`AsyncPrefs::new`], taking the read timeout from `config`
    pub fn from_config(store: Arc<S>, queue: TaskQueue, config: &Config) -> Self {
        Self::new(store, queue).with_read_timeout(config.read_timeout())
    }

    /// Override the `read_blocking` bound
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Current `read_blocking` bound
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Values of `key` over time, `default` when missing or undecodable
    pub fn read_flow<T>(&self, key: &Key<T>, default: T) -> Flow<T, S>
    where
        T: PrefCodec + Clone + Send + Sync + 'static,
    {
        let name = key.name();
        Flow {
            store: Arc::clone(&self.store),
            key: name,
            decode: Arc::new(move |raw: Option<&EncodedValue>| {
                codec::decode_or(name, raw, default.clone())
            }),
        }
    }

    /// Values of `key` over time, `None` when missing or undecodable
    pub fn read_flow_opt<T>(&self, key: &Key<T>) -> Flow<Option<T>, S>
    where
        T: PrefCodec + 'static,
    {
        let name = key.name();
        Flow {
            store: Arc::clone(&self.store),
            key: name,
            decode: Arc::new(move |raw: Option<&EncodedValue>| codec::decode_opt(name, raw)),
        }
    }

    /// Current value of `key`, or `default` if missing, undecodable, or not
    /// delivered within the read timeout
    pub fn read_blocking<T>(&self, key: &Key<T>, default: T) -> T
    where
        T: PrefCodec + Clone + Send + Sync + 'static,
    {
        self.read_flow(key, default.clone())
            .first(self.read_timeout)
            .unwrap_or(default)
    }

    /// Current value of `key`, or `None` if missing, undecodable, or not
    /// delivered within the read timeout
    pub fn read_blocking_opt<T>(&self, key: &Key<T>) -> Option<T>
    where
        T: PrefCodec + 'static,
    {
        self.read_flow_opt(key).first(self.read_timeout).flatten()
    }

    /// Whether any value is stored under `name`, regardless of type
    pub fn contains(&self, name: &str) -> bool {
        self.store.snapshot().contains_key(name)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key` (`None` removes it), blocking until the
    /// transaction is persisted
    pub fn write<T: PrefCodec>(&self, key: &Key<T>, value: impl Into<Option<T>>) -> Result<()> {
        self.store.update(super::write_edit(key, value.into()))
    }

    /// Queue a write of `value` under `key` (`None` removes it) and return
    /// immediately
    ///
    /// Writes queued through one adapter run in submission order. Failures
    /// are logged and dropped.
    pub fn write_async<T: PrefCodec>(&self, key: &Key<T>, value: impl Into<Option<T>>) {
        let edit = super::write_edit(key, value.into());
        let name = key.name();
        let store = Arc::clone(&self.store);

        let queued = self.queue.spawn(move || {
            if let Err(e) = store.update(edit) {
                tracing::warn!(key = name, "Background write failed: {}", e);
            }
        });

        if let Err(e) = queued {
            tracing::warn!(key = name, "Background write dropped: {}", e);
        }
    }

    /// Remove `key`, blocking until the transaction is persisted
    pub fn remove<T>(&self, key: &Key<T>) -> Result<()> {
        self.store.update(Edit::new().remove(key.name()))
    }

    /// Remove every key, blocking until the transaction is persisted
    pub fn clear_all(&self) -> Result<()> {
        tracing::debug!("Clearing all preferences");
        self.store.update(Edit::new().clear())
    }

    /// Block until every write queued by `write_async` so far has run
    pub fn sync(&self) -> Result<()> {
        self.queue.drain()
    }
}

// =============================================================================
// Flow / Subscription
// =============================================================================

/// Cold description of a key's values over time
///
/// Nothing is registered with the store until [`Flow::subscribe`]; each call
/// starts an independent subscription.
pub struct Flow<V, S = TxStore> {
    store: Arc<S>,
    key: &'static str,
    decode: Decoder<V>,
}

impl<V, S> Clone for Flow<V, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<V, S: TransactionalStore> Flow<V, S> {
    /// Key this flow observes
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Start a new subscription
    pub fn subscribe(&self) -> Subscription<V> {
        Subscription {
            receiver: self.store.subscribe(),
            key: self.key,
            decode: Arc::clone(&self.decode),
            last_raw: None,
        }
    }

    /// First value of a fresh subscription, `None` on timeout
    pub fn first(&self, timeout: Duration) -> Option<V> {
        match self.store.first_snapshot(timeout) {
            Some(snapshot) => Some((self.decode)(snapshot.get(self.key))),
            None => {
                tracing::debug!(key = self.key, ?timeout, "No value delivered before timeout");
                None
            }
        }
    }
}

impl<V, S: TransactionalStore> IntoIterator for &Flow<V, S> {
    type Item = V;
    type IntoIter = Subscription<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.subscribe()
    }
}

/// Live stream of a key's decoded values
///
/// Yields the value current at subscription time, then one value each time
/// a transaction changes the key's stored value. Never ends while the store
/// is alive; drop it to unsubscribe.
pub struct Subscription<V> {
    receiver: Receiver<Snapshot>,
    key: &'static str,
    decode: Decoder<V>,
    /// Raw value last emitted (`Some(None)` = emitted "missing")
    last_raw: Option<Option<EncodedValue>>,
}

impl<V> Subscription<V> {
    /// Key this subscription observes
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Next value if one is already available
    pub fn try_next(&mut self) -> Option<V> {
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => {
                    if let Some(value) = self.accept(&snapshot) {
                        return Some(value);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Next value, waiting at most `timeout`
    ///
    /// A timeout too large to form a deadline waits without bound.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<V> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let snapshot = match deadline {
                Some(deadline) => self.receiver.recv_deadline(deadline).ok()?,
                None => self.receiver.recv().ok()?,
            };
            if let Some(value) = self.accept(&snapshot) {
                return Some(value);
            }
        }
    }

    /// Decode `snapshot` if it changes this key, else `None`
    fn accept(&mut self, snapshot: &Snapshot) -> Option<V> {
        let raw = snapshot.get(self.key).cloned();
        if self.last_raw.as_ref() == Some(&raw) {
            return None;
        }

        let value = (self.decode)(raw.as_ref());
        self.last_raw = Some(raw);
        Some(value)
    }
}

impl<V> Iterator for Subscription<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        loop {
            let snapshot = self.receiver.recv().ok()?;
            if let Some(value) = self.accept(&snapshot) {
                return Some(value);
            }
        }
    }
}
