//! Store Error Types
//!
//! Errors raised by a [`crate::db::DocumentStore`] implementation. Services
//! surface these to callers as persistence failures.

use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write was attempted and failed
    #[error("Write failed: {context}")]
    WriteFailed { context: String },

    /// A record with the same identity already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A conditional write found a different version than expected
    #[error("Version mismatch for {id}: expected {expected}, found {actual}")]
    VersionMismatch {
        id: String,
        expected: i64,
        actual: i64,
    },

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a write failed error with context
    pub fn write_failed(context: impl Into<String>) -> Self {
        Self::WriteFailed {
            context: context.into(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey(key.into())
    }

    /// Create a version mismatch error
    pub fn version_mismatch(id: impl Into<String>, expected: i64, actual: i64) -> Self {
        Self::VersionMismatch {
            id: id.into(),
            expected,
            actual,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
