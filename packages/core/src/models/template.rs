//! Page Templates

use crate::models::ContentBlock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reusable starting content for new pages
///
/// `space_id = None` makes the template available in every space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub space_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: Vec<ContentBlock>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn new(
        space_id: Option<String>,
        name: String,
        description: String,
        content: Vec<ContentBlock>,
        actor: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            space_id,
            name,
            description,
            content,
            created_by: actor.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether the template can seed pages in `space_id`
    pub fn is_available_in(&self, space_id: &str) -> bool {
        self.space_id.as_deref().map_or(true, |id| id == space_id)
    }
}
