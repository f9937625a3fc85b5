//! Space Data Structures
//!
//! A space is a named top-level collection of pages. Spaces are only ever
//! soft-deleted: `status = deleted` hides them from every read path while the
//! record itself stays in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    #[default]
    Team,
    Project,
    Personal,
    Documentation,
}

/// Space lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceStatus {
    #[default]
    Active,
    Archived,
    Deleted,
}

/// A named collection of pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,

    /// Short unique uppercase key (e.g. "ENG")
    pub key: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    pub space_type: SpaceType,

    pub status: SpaceStatus,

    /// Weak reference to the landing page; may dangle after the page is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_id: Option<String>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl Space {
    /// Create an active space. `key` must already be normalized.
    pub fn new(
        key: String,
        name: String,
        description: String,
        space_type: SpaceType,
        actor: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            key,
            name,
            description,
            space_type,
            status: SpaceStatus::Active,
            home_page_id: None,
            created_by: actor.to_string(),
            created_at: now,
            updated_by: actor.to_string(),
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == SpaceStatus::Deleted
    }
}

/// Input for creating a space
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceInput {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub space_type: SpaceType,
}

/// Sparse update for a space; `None` leaves the field unchanged
///
/// `home_page_id` uses a double option: `Some(None)` clears the home page.
#[derive(Debug, Clone, Default)]
pub struct SpaceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub space_type: Option<SpaceType>,
    pub status: Option<SpaceStatus>,
    pub home_page_id: Option<Option<String>>,
}

impl SpaceUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.space_type.is_none()
            && self.status.is_none()
            && self.home_page_id.is_none()
    }
}
