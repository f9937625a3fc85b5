//! Service Layer Error Types
//!
//! Write paths surface validation and persistence failures through
//! [`ServiceError`]. Missing or soft-deleted records are not errors: read
//! paths return `Ok(None)` or an empty collection instead.

use crate::db::StoreError;
use crate::models::ValidationError;
use crate::services::tree_builder::TreeError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Input rejected before anything was written
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The underlying store failed
    #[error("Persistence failed: {0}")]
    Persistence(#[source] StoreError),

    /// The stored hierarchy is inconsistent (cycle or runaway depth)
    #[error("Hierarchy corruption: {0}")]
    Corruption(#[from] TreeError),

    /// The page changed since the caller loaded it
    #[error("Version conflict for page {page_id}: expected version {expected}, found {actual}")]
    VersionConflict {
        page_id: String,
        expected: i64,
        actual: i64,
    },
}

impl ServiceError {
    /// Create a version conflict error
    pub fn version_conflict(page_id: impl Into<String>, expected: i64, actual: i64) -> Self {
        Self::VersionConflict {
            page_id: page_id.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid reference error for a missing or deleted record
    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::invalid_reference(msg))
    }

    /// True for failures the caller can fix by reloading and retrying
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionMismatch {
                id,
                expected,
                actual,
            } => Self::version_conflict(id, expected, actual),
            other => Self::Persistence(other),
        }
    }
}
