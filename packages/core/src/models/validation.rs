//! Validation Rules
//!
//! Input validation shared by the models and services. Everything here is
//! pure: a failed check produces a [`ValidationError`] that services surface
//! to the caller unchanged.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Space keys: a leading letter followed by 1-9 letters or digits (after uppercasing)
static SPACE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,9}$").unwrap());

/// Validation errors for models and write-path inputs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title exceeds {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },

    #[error("Invalid space key '{0}': expected 2-10 letters or digits starting with a letter")]
    InvalidSpaceKey(String),

    #[error("Space key '{0}' is already in use")]
    DuplicateSpaceKey(String),

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Circular reference: page '{page_id}' cannot be placed under '{target_id}'")]
    CircularReference { page_id: String, target_id: String },

    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl ValidationError {
    /// Create an invalid parent error
    pub fn invalid_parent(msg: impl Into<String>) -> Self {
        Self::InvalidParent(msg.into())
    }

    /// Create a circular reference error
    pub fn circular_reference(page_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::CircularReference {
            page_id: page_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Create an invalid block error
    pub fn invalid_block(msg: impl Into<String>) -> Self {
        Self::InvalidBlock(msg.into())
    }

    /// Create an invalid label error
    pub fn invalid_label(msg: impl Into<String>) -> Self {
        Self::InvalidLabel(msg.into())
    }

    /// Create an invalid reference error
    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }
}

/// Validate a page or space title, returning the trimmed title
///
/// # Errors
///
/// - [`ValidationError::EmptyTitle`] when the title is empty or whitespace
/// - [`ValidationError::TitleTooLong`] when it exceeds `max_len` characters
///
/// # Examples
///
/// ```
/// use wikispace_core::models::validate_title;
///
/// assert_eq!(validate_title("  Getting Started ", 255).unwrap(), "Getting Started");
/// assert!(validate_title("   ", 255).is_err());
/// ```
pub fn validate_title(title: &str, max_len: usize) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let actual = trimmed.chars().count();
    if actual > max_len {
        return Err(ValidationError::TitleTooLong {
            max: max_len,
            actual,
        });
    }

    Ok(trimmed.to_string())
}

/// Normalize a space key to uppercase and check its shape
///
/// # Examples
///
/// ```
/// use wikispace_core::models::normalize_space_key;
///
/// assert_eq!(normalize_space_key(" eng ").unwrap(), "ENG");
/// assert!(normalize_space_key("1abc").is_err());
/// assert!(normalize_space_key("a").is_err());
/// ```
pub fn normalize_space_key(key: &str) -> Result<String, ValidationError> {
    let normalized = key.trim().to_uppercase();
    if !SPACE_KEY_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidSpaceKey(key.to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("\tRoadmap\n", 50).unwrap(), "Roadmap");
    }

    #[test]
    fn test_validate_title_length_counts_chars() {
        // Multi-byte characters count once each
        let title = "é".repeat(10);
        assert!(validate_title(&title, 10).is_ok());
        assert_eq!(
            validate_title(&title, 9),
            Err(ValidationError::TitleTooLong { max: 9, actual: 10 })
        );
    }

    #[test]
    fn test_space_key_rules() {
        assert_eq!(normalize_space_key("docs").unwrap(), "DOCS");
        assert_eq!(normalize_space_key("Team42").unwrap(), "TEAM42");
        assert!(normalize_space_key("").is_err());
        assert!(normalize_space_key("with space").is_err());
        assert!(normalize_space_key("ABCDEFGHIJK").is_err());
        assert!(normalize_space_key("A-B").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::circular_reference("page-1", "page-2");
        assert_eq!(
            err.to_string(),
            "Circular reference: page 'page-1' cannot be placed under 'page-2'"
        );
    }
}
