//! Type-safe preference keys.
//!
//! A [`Key<T>`] binds a key name to the codec of its value type at compile
//! time, so a key written as a date can only be read back as a date.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::codec::PrefEnum;

/// Declare a const preference key.
///
/// # Example
/// ```rust
/// use prefkv::pref_key;
///
/// pref_key!(pub const LAUNCH_COUNT: i32 = "launch_count");
/// pref_key!(const USER_NAME: String = "user_name");
/// ```
#[macro_export]
macro_rules! pref_key {
    ($vis:vis const $name:ident: $ty:ty = $key:literal) => {
        $vis const $name: $crate::key::Key<$ty> = $crate::key::Key::new($key);
    };
}

/// Type-safe handle to one preference
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Create a key with the given storage name
    #[doc(hidden)]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Storage name of this key
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

// Manual impls so `T` itself needn't be Copy/Clone/Debug.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

// =============================================================================
// Typed Constructors
// =============================================================================

impl Key<String> {
    pub const fn string(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<i32> {
    pub const fn int(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<i64> {
    pub const fn long(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<f64> {
    pub const fn double(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<bool> {
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<DateTime<Utc>> {
    /// Calendar date, stored as epoch milliseconds
    pub const fn date(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<NaiveDate> {
    /// Local date, stored as epoch days
    pub const fn local_date(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<NaiveTime> {
    /// Local time, stored as seconds since midnight
    pub const fn local_time(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Key<NaiveDateTime> {
    /// Local date-time, stored as epoch seconds (UTC)
    pub const fn local_date_time(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl<E: PrefEnum> Key<E> {
    /// Enumeration, stored by member name
    pub const fn enumeration(name: &'static str) -> Self {
        Self::new(name)
    }
}
