//! Space-scoped labels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed label palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    #[default]
    Gray,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
}

/// A tag that can be attached to pages of one space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub space_id: String,
    /// Normalized (trimmed, lowercase) name, unique within the space
    pub name: String,
    pub color: LabelColor,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(space_id: String, name: String, color: LabelColor) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            space_id,
            name,
            color,
            created_at: Utc::now(),
        }
    }
}

/// Normalize a label name for storage and comparison
pub fn normalize_label_name(name: &str) -> String {
    name.trim().to_lowercase()
}
