//! Error types for prefkv
//!
//! Decode failures never reach this type; they degrade to defaults inside
//! the codec layer. Only store I/O and setup paths return errors.

use thiserror::Error;

/// Result type alias using PrefError
pub type Result<T> = std::result::Result<T, PrefError>;

/// Unified error type for prefkv operations
#[derive(Debug, Error)]
pub enum PrefError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot File Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot corruption detected: {0}")]
    Corruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Parse error: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Task queue closed: {0}")]
    QueueClosed(String),
}

impl From<bincode::Error> for PrefError {
    fn from(e: bincode::Error) -> Self {
        PrefError::Serialization(e.to_string())
    }
}
