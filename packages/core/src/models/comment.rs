//! Page Comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a page, optionally replying to another comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub page_id: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        page_id: String,
        author: &str,
        body: String,
        parent_comment_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            page_id,
            parent_comment_id,
            author: author.to_string(),
            body,
            resolved: false,
            created_at: now,
            updated_at: now,
        }
    }
}
