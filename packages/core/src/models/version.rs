//! Page Version Snapshots
//!
//! Every content-affecting page update appends one immutable [`PageVersion`]
//! carrying the page's title and content *after* the update, numbered with
//! the page's new version. Page creation records no snapshot.

use crate::models::{ContentBlock, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a page revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion {
    pub page_id: String,
    pub version: i64,
    pub title: String,
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl PageVersion {
    /// Snapshot the current state of an (already updated) page
    pub fn snapshot(page: &Page, message: Option<String>) -> Self {
        Self {
            page_id: page.id.clone(),
            version: page.version,
            title: page.title.clone(),
            content: page.content.clone(),
            message,
            author: page.updated_by.clone(),
            created_at: page.updated_at,
        }
    }
}
