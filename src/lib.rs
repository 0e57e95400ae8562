//! # prefkv
//!
//! Typed preference accessors over two kinds of key-value store:
//! - a flat store with synchronous reads and background or blocking flushes
//! - a transactional store read through subscriptions
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Consumer preference definitions                │
//! │                (Key<T> consts, pref_key!)                   │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │       SyncPrefs        │     │         AsyncPrefs         │
//!   │  get / set / set_now   │     │ read_flow / read_blocking  │
//!   │  contains / clear_all  │     │ write / write_async        │
//!   └───────────┬────────────┘     └──────┬──────────────┬──────┘
//!               │                         │              │
//!               │        ┌────────────────┴───┐   ┌──────▼──────┐
//!               │        │   Typed Codec      │   │  TaskQueue  │
//!               ├───────▶│ (EncodedValue ⇄ T) │◀──┤ (FIFO bg)   │
//!               │        └────────────────────┘   └──────┬──────┘
//!               ▼                                        ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │  FileStore (FlatStore) │     │  TxStore (Transactional)   │
//!   └───────────┬────────────┘     └──────────────┬─────────────┘
//!               └──────────────┬──────────────────┘
//!                              ▼
//!                     {data_dir}/{store}.prefs
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use prefkv::{pref_key, Config, FileStore, SyncPrefs};
//!
//! pref_key!(const LAUNCH_COUNT: i32 = "launch_count");
//!
//! # fn main() -> prefkv::Result<()> {
//! let config = Config::builder().data_dir("./data").store_name("app").build();
//! let prefs = SyncPrefs::new(Arc::new(FileStore::open(&config)?));
//!
//! let launches = prefs.get(&LAUNCH_COUNT, 0);
//! prefs.set(&LAUNCH_COUNT, launches + 1);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod key;
pub mod queue;
pub mod store;
pub mod adapter;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PrefError, Result};
pub use config::{Config, DEFAULT_READ_TIMEOUT};
pub use codec::{EncodedValue, PrefCodec, PrefEnum};
pub use key::Key;
pub use queue::TaskQueue;
pub use store::{FileStore, FlatStore, TransactionalStore, TxStore};
pub use adapter::{AsyncPrefs, Flow, Subscription, SyncPrefs};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of prefkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
