//! Codec for enumerations stored by member name.

use super::{EncodedValue, PrefCodec};

/// An enumeration that can be stored by name
///
/// Implementations supply an explicit member table; lookups scan it by
/// exact (case-sensitive) name. Use [`pref_enum!`](crate::pref_enum) to
/// derive the table for a fieldless enum.
pub trait PrefEnum: Copy + 'static {
    /// Every member, in declaration order
    const VARIANTS: &'static [Self];

    /// Symbolic name persisted for this member
    fn name(&self) -> &'static str;

    /// Find the member called `name`
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == name)
    }
}

impl<E: PrefEnum> PrefCodec for E {
    const SENTINEL: Option<EncodedValue> = Some(EncodedValue::Str(String::new()));

    fn encode(&self) -> EncodedValue {
        EncodedValue::Str(self.name().to_string())
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Str(name) => E::from_name(name),
            _ => None,
        }
    }

    fn is_absent(raw: &EncodedValue) -> bool {
        matches!(raw, EncodedValue::Str(s) if s.trim().is_empty())
    }
}

/// Implement [`PrefEnum`] for a fieldless enum, naming members after their
/// identifiers.
///
/// # Example
/// ```rust
/// use prefkv::pref_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Theme {
///     Light,
///     Dark,
/// }
///
/// pref_enum!(Theme { Light, Dark });
/// ```
#[macro_export]
macro_rules! pref_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::codec::PrefEnum for $name {
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }
    };
}
