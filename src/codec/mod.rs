//! Typed Codec Module
//!
//! Bidirectional mapping between domain values and the primitive
//! [`EncodedValue`]s a store persists.
//!
//! ## Encodings
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────────────┐
//! │ Domain type          │ Encoded  │ Meaning                      │
//! ├──────────────────────┼──────────┼──────────────────────────────┤
//! │ String               │ Str      │ verbatim ("" is a value)     │
//! │ i32 / i64 / f64      │ Int/Long │ verbatim                     │
//! │ bool                 │ Bool     │ verbatim                     │
//! │ DateTime<Utc>        │ Long     │ millis since epoch           │
//! │ NaiveDateTime        │ Long     │ seconds since epoch (UTC)    │
//! │ NaiveDate            │ Long     │ days since 1970-01-01        │
//! │ NaiveTime            │ Long     │ seconds since midnight       │
//! │ PrefEnum             │ Str      │ member name                  │
//! └──────────────────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! ## Absence
//! Temporal codecs reserve `Long(-1)` and enum codecs reserve a blank string
//! as "absent". Reading a sentinel yields the caller's default.
//!
//! Decoding never fails loudly: wrong types, unparseable strings and unknown
//! enum names all degrade to the default with a `warn` record naming the key.

mod enumeration;
mod primitive;
mod temporal;
mod value;

pub use enumeration::PrefEnum;
pub use temporal::ABSENT_LONG;
pub use value::EncodedValue;

/// Mapping between a domain type and its encoded form
pub trait PrefCodec: Sized {
    /// Encoded value reserved for "absent", if this type has one
    const SENTINEL: Option<EncodedValue> = None;

    /// Encode a present value
    fn encode(&self) -> EncodedValue;

    /// Decode a raw value, `None` if it has the wrong type or does not parse
    fn decode(raw: &EncodedValue) -> Option<Self>;

    /// Whether `raw` is this type's absence marker
    fn is_absent(raw: &EncodedValue) -> bool {
        Self::SENTINEL.as_ref() == Some(raw)
    }
}

/// Encode a possibly-null value
///
/// `None` maps to the type's sentinel when it has one. A `None` result means
/// the key should be removed instead of written.
pub fn encode_nullable<T: PrefCodec>(value: Option<&T>) -> Option<EncodedValue> {
    match value {
        Some(v) => Some(v.encode()),
        None => T::SENTINEL,
    }
}

/// Decode a raw value read under `key`
///
/// Missing raw values and sentinels give `None` silently; anything else that
/// fails to decode gives `None` with a diagnostic.
pub fn decode_opt<T: PrefCodec>(key: &str, raw: Option<&EncodedValue>) -> Option<T> {
    let raw = raw?;
    if T::is_absent(raw) {
        return None;
    }

    match T::decode(raw) {
        Some(value) => Some(value),
        None => {
            tracing::warn!(
                key,
                raw = %raw,
                stored_type = raw.type_name(),
                "Failed to decode preference, falling back to default"
            );
            None
        }
    }
}

/// Decode a raw value read under `key`, falling back to `default`
pub fn decode_or<T: PrefCodec>(key: &str, raw: Option<&EncodedValue>, default: T) -> T {
    decode_opt(key, raw).unwrap_or(default)
}
