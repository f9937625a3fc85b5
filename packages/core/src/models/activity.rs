//! Activity Feed and Recent Visits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    SpaceCreated,
    SpaceUpdated,
    SpaceDeleted,
    PageCreated,
    PageUpdated,
    PagePublished,
    PageMoved,
    PageDeleted,
    CommentAdded,
}

/// One entry in a space's activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub space_id: String,
    #[serde(default)]
    pub page_id: Option<String>,
    pub actor: String,
    pub kind: ActivityKind,
    pub summary: String,
    pub at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        space_id: &str,
        page_id: Option<&str>,
        actor: &str,
        kind: ActivityKind,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            space_id: space_id.to_string(),
            page_id: page_id.map(str::to_string),
            actor: actor.to_string(),
            kind,
            summary: summary.into(),
            at: Utc::now(),
        }
    }
}

/// Last time a user opened a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentVisit {
    pub user_id: String,
    pub page_id: String,
    pub visited_at: DateTime<Utc>,
}
