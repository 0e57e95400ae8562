//! Encoded values
//!
//! The primitive representations a store persists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value as physically stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncodedValue {
    /// UTF-8 string (may be empty)
    Str(String),

    /// 32-bit integer
    Int(i32),

    /// 64-bit integer
    Long(i64),

    /// Double-precision float
    Double(f64),

    /// Boolean
    Bool(bool),
}

impl EncodedValue {
    /// Short name of the stored type, used in logs and the CLI
    pub fn type_name(&self) -> &'static str {
        match self {
            EncodedValue::Str(_) => "string",
            EncodedValue::Int(_) => "int",
            EncodedValue::Long(_) => "long",
            EncodedValue::Double(_) => "double",
            EncodedValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for EncodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedValue::Str(s) => write!(f, "{:?}", s),
            EncodedValue::Int(v) => write!(f, "{}", v),
            EncodedValue::Long(v) => write!(f, "{}", v),
            EncodedValue::Double(v) => write!(f, "{}", v),
            EncodedValue::Bool(v) => write!(f, "{}", v),
        }
    }
}
