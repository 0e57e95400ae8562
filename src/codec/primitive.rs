//! Codecs for types the stores hold natively.

use super::{EncodedValue, PrefCodec};

impl PrefCodec for String {
    fn encode(&self) -> EncodedValue {
        EncodedValue::Str(self.clone())
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl PrefCodec for i32 {
    fn encode(&self) -> EncodedValue {
        EncodedValue::Int(*self)
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl PrefCodec for i64 {
    fn encode(&self) -> EncodedValue {
        EncodedValue::Long(*self)
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Long(v) => Some(*v),
            // Lossless widening for values first written as ints
            EncodedValue::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

impl PrefCodec for f64 {
    fn encode(&self) -> EncodedValue {
        EncodedValue::Double(*self)
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl PrefCodec for bool {
    fn encode(&self) -> EncodedValue {
        EncodedValue::Bool(*self)
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}
