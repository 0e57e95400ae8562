//! Adapter Module
//!
//! Typed accessors over the two store kinds.
//!
//! ```text
//!   Key<T> + value                          Key<T> + default
//!        │                                         ▲
//!        ▼ PrefCodec::encode                       │ codec::decode_or
//!   ┌─────────┐     ┌──────────────┐        ┌──────┴──────┐
//!   │  Edit   │ ──▶ │ FlatStore /  │ ─────▶ │ EncodedValue│
//!   └─────────┘     │ TxStore      │        └─────────────┘
//!                   └──────────────┘
//! ```
//!
//! - [`SyncPrefs`]: synchronous reads, background or blocking writes
//! - [`AsyncPrefs`]: subscriptions, blocking reads with a timeout, blocking
//!   and fire-and-forget writes
//!
//! Writing `None` through either adapter removes the key; the adapters never
//! write absence sentinels.

mod reactive;
mod sync;

pub use reactive::{AsyncPrefs, Flow, Subscription};
pub use sync::SyncPrefs;

use crate::codec::PrefCodec;
use crate::key::Key;
use crate::store::Edit;

/// Edit that writes `value` under `key`, or removes `key` for `None`
fn write_edit<T: PrefCodec>(key: &Key<T>, value: Option<T>) -> Edit {
    match value {
        Some(value) => Edit::new().put(key.name(), value.encode()),
        None => Edit::new().remove(key.name()),
    }
}
