//! Page Data Structures
//!
//! A page is a hierarchical document inside a space. Pages reference their
//! parent through a flat `parent_id` back-pointer and are ordered among their
//! siblings by an explicit ascending `position`.
//!
//! # Examples
//!
//! ```rust
//! use wikispace_core::models::{generate_slug, next_position};
//!
//! assert_eq!(generate_slug("  Hello, World!! "), "hello-world");
//! assert_eq!(next_position([0, 3, 1]), 4);
//! assert_eq!(next_position(Vec::<i64>::new()), 0);
//! ```

use crate::models::ContentBlock;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// Default version value for serde deserialization (version 1)
fn default_version() -> i64 {
    1
}

/// Slug used when a title has no slug-safe characters at all
pub const FALLBACK_SLUG: &str = "untitled";

/// Compiled slug patterns, applied in order
static SLUG_DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9 -]").unwrap());
static SLUG_WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SLUG_HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Derive a URL slug from a title
///
/// Lowercases, strips everything outside `[a-z0-9 -]`, turns whitespace runs
/// into hyphens, collapses repeated hyphens and trims hyphens from both ends.
/// A title with no slug-safe characters yields [`FALLBACK_SLUG`], so the
/// result always matches `[a-z0-9]+(-[a-z0-9]+)*`.
///
/// Slugs are not unique within a space; see `EngineConfig::enforce_unique_slugs`.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_DISALLOWED_RE.replace_all(&lowered, "");
    let hyphenated = SLUG_WHITESPACE_RE.replace_all(&stripped, "-");
    let collapsed = SLUG_HYPHENS_RE.replace_all(&hyphenated, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Position for a new sibling: one past the current maximum, or 0 for the first
pub fn next_position<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(0, |max| max + 1)
}

/// Page lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// A hierarchical document composed of content blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,

    /// Owning space (must resolve to a non-deleted space)
    pub space_id: String,

    pub title: String,

    /// Derived from the title; not guaranteed unique
    pub slug: String,

    /// Ordered page body
    pub content: Vec<ContentBlock>,

    pub status: PageStatus,

    /// Parent page; `None` means the page is a root of its space
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Sibling sort key (ascending)
    pub position: i64,

    /// Content revision, incremented by exactly 1 per content-affecting update
    #[serde(default = "default_version")]
    pub version: i64,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Create a draft page at version 1
    ///
    /// An empty `content` list is replaced with a single empty paragraph so a
    /// page always holds at least one block.
    pub fn new(
        space_id: String,
        title: String,
        parent_id: Option<String>,
        position: i64,
        content: Vec<ContentBlock>,
        actor: &str,
    ) -> Self {
        let now = Utc::now();
        let slug = generate_slug(&title);
        let content = if content.is_empty() {
            vec![ContentBlock::paragraph()]
        } else {
            content
        };

        Self {
            id: Uuid::new_v4().to_string(),
            space_id,
            title,
            slug,
            content,
            status: PageStatus::Draft,
            parent_id,
            position,
            version: 1,
            created_by: actor.to_string(),
            created_at: now,
            updated_by: actor.to_string(),
            updated_at: now,
            published_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == PageStatus::Archived
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageInput {
    pub space_id: String,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Initial body; takes precedence over `template_id`
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    /// Seed the body from a template
    #[serde(default)]
    pub template_id: Option<String>,
}

impl CreatePageInput {
    pub fn new(space_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_content(mut self, content: Vec<ContentBlock>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }
}

/// Sparse page update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub content: Option<Vec<ContentBlock>>,
    pub status: Option<PageStatus>,
    /// Optional note stored on the version snapshot
    pub change_message: Option<String>,
    /// When set, the update is rejected unless the page is still at this version
    pub expected_version: Option<i64>,
}

impl PageUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: Vec<ContentBlock>) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: PageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.change_message = Some(message.into());
        self
    }

    pub fn with_expected_version(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Target of a move operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePageInput {
    /// New parent; `None` moves the page to the root level
    #[serde(default)]
    pub target_parent: Option<String>,
    /// Index among the new siblings (clamped to the sibling count)
    pub target_position: i64,
    /// Move the page (and its subtree) into another space
    #[serde(default)]
    pub target_space: Option<String>,
}

/// One ancestor in a page's breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub id: String,
    pub title: String,
    pub slug: String,
}

impl From<&Page> for Breadcrumb {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            slug: page.slug.clone(),
        }
    }
}

/// A page enriched for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetails {
    #[serde(flatten)]
    pub page: Page,
    pub author_id: String,
    pub editor_id: String,
    /// Ancestors, root first
    pub breadcrumbs: Vec<Breadcrumb>,
    pub child_count: usize,
    pub comment_count: usize,
    pub attachment_count: usize,
    pub labels: Vec<String>,
}
