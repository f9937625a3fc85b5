//! DocumentStore Trait - Persistence Abstraction
//!
//! This module defines the `DocumentStore` trait that abstracts durable
//! storage for spaces, pages and their collaboration data. Business rules
//! (slug derivation, sibling positions, reparenting, validation) live in the
//! services; a store only keeps records and guarantees the atomicity of the
//! few compound writes declared here.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so network-backed stores fit
//!    behind the same trait as [`crate::db::InMemoryStore`]
//! 2. **Ownership Semantics**: Writes take records by value; reads return
//!    owned clones
//! 3. **Raw Reads**: Reads return soft-deleted spaces and archived pages too;
//!    visibility filtering is a service concern
//! 4. **Atomic Revisions**: [`DocumentStore::commit_page_revision`] bumps the
//!    page version and appends its snapshot as one write
//! 5. **Field Ownership**: Revisions write only content fields and structural
//!    writes only hierarchy fields, so a concurrent edit and move both land
//!
//! # Examples
//!
//! ```rust,no_run
//! use wikispace_core::db::{DocumentStore, InMemoryStore};
//! use wikispace_core::models::{Space, SpaceType};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), wikispace_core::db::StoreError> {
//! let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
//! let space = Space::new(
//!     "ENG".to_string(),
//!     "Engineering".to_string(),
//!     String::new(),
//!     SpaceType::Team,
//!     "user-1",
//! );
//! store.insert_space(space).await?;
//! # Ok(())
//! # }
//! ```

use crate::db::StoreError;
use crate::models::{Activity, Comment, Label, Page, PageVersion, RecentVisit, Space, Template};
use async_trait::async_trait;

/// Persistence contract for the document engine
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so services can share them across
/// tasks behind an `Arc`.
///
/// # Method Categories
///
/// - **Spaces**: insert, get, find by key, list, replace
/// - **Pages**: insert, get, list, revision commit, batch replace, remove
/// - **Versions**: list snapshots
/// - **Labels / Templates / Comments / Activity / Visits**: simple record CRUD
#[async_trait]
pub trait DocumentStore: Send + Sync {
    //
    // SPACES
    //

    /// Insert a new space
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateKey`] if the id is already present
    async fn insert_space(&self, space: Space) -> Result<Space, StoreError>;

    /// Get a space by id, including soft-deleted spaces
    async fn get_space(&self, id: &str) -> Result<Option<Space>, StoreError>;

    /// Find a space by its normalized key, including soft-deleted spaces
    ///
    /// When several spaces share a key (a deleted one and its replacement),
    /// a non-deleted space is preferred.
    async fn find_space_by_key(&self, key: &str) -> Result<Option<Space>, StoreError>;

    /// All spaces, ordered by key
    async fn list_spaces(&self) -> Result<Vec<Space>, StoreError>;

    /// Replace a stored space; `Ok(None)` if it does not exist
    async fn replace_space(&self, space: Space) -> Result<Option<Space>, StoreError>;

    //
    // PAGES
    //

    /// Insert a new page as given
    async fn insert_page(&self, page: Page) -> Result<Page, StoreError>;

    /// Insert a new page after its last sibling
    ///
    /// The caller's `position` is ignored. The store assigns one past the
    /// highest position among pages with the same space and parent, in the
    /// same write as the insert, so concurrent creates never share a slot.
    async fn insert_page_at_end(&self, page: Page) -> Result<Page, StoreError>;

    /// Get a page by id
    async fn get_page(&self, id: &str) -> Result<Option<Page>, StoreError>;

    /// All pages of a space in every status, ordered by creation time
    async fn list_pages_in_space(&self, space_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Every stored page, ordered by creation time
    async fn list_all_pages(&self) -> Result<Vec<Page>, StoreError>;

    /// Persist a content-affecting update and its version snapshot atomically
    ///
    /// The store assigns `version = stored.version + 1` (never the caller's
    /// value), stamps the snapshot with that number, then writes both. When
    /// `expected_version` is set and differs from the stored version, nothing
    /// is written and [`StoreError::VersionMismatch`] is returned.
    ///
    /// Only `title`, `slug`, `content`, `status`, `published_at`,
    /// `updated_by` and `updated_at` are taken from `page`. The stored
    /// `space_id`, `parent_id` and `position` are kept.
    ///
    /// # Returns
    ///
    /// The page as stored, or `Ok(None)` if the page no longer exists
    async fn commit_page_revision(
        &self,
        page: Page,
        message: Option<String>,
        expected_version: Option<i64>,
    ) -> Result<Option<Page>, StoreError>;

    /// Write the placement of several pages at once without touching versions
    ///
    /// Used for structural changes (move, renumbering). Only `space_id`,
    /// `parent_id`, `position`, `updated_by` and `updated_at` are taken from
    /// each page, plus `slug` when the page changes space. All pages must
    /// exist; otherwise nothing is written.
    async fn replace_pages(&self, pages: Vec<Page>) -> Result<(), StoreError>;

    /// Remove a page after writing its reparented children, as one write
    ///
    /// Children are written with the same field rules as
    /// [`DocumentStore::replace_pages`].
    ///
    /// Also drops the page's versions, label links, comments and visits.
    ///
    /// # Returns
    ///
    /// `false` if the page did not exist (nothing is written)
    async fn remove_page(&self, id: &str, reparented: Vec<Page>) -> Result<bool, StoreError>;

    //
    // VERSIONS
    //

    /// Snapshots of a page, ascending by version
    async fn list_versions(&self, page_id: &str) -> Result<Vec<PageVersion>, StoreError>;

    //
    // LABELS
    //

    async fn insert_label(&self, label: Label) -> Result<Label, StoreError>;

    async fn get_label(&self, id: &str) -> Result<Option<Label>, StoreError>;

    /// Labels of a space, ordered by name
    async fn list_labels(&self, space_id: &str) -> Result<Vec<Label>, StoreError>;

    /// Attach a label; attaching twice is a no-op. Returns `true` if newly attached.
    async fn attach_label(&self, page_id: &str, label_id: &str) -> Result<bool, StoreError>;

    /// Detach a label. Returns `true` if it was attached.
    async fn detach_label(&self, page_id: &str, label_id: &str) -> Result<bool, StoreError>;

    /// Labels attached to a page, ordered by name
    async fn labels_for_page(&self, page_id: &str) -> Result<Vec<Label>, StoreError>;

    /// Ids of pages carrying a label
    async fn pages_with_label(&self, label_id: &str) -> Result<Vec<String>, StoreError>;

    //
    // TEMPLATES
    //

    async fn insert_template(&self, template: Template) -> Result<Template, StoreError>;

    async fn get_template(&self, id: &str) -> Result<Option<Template>, StoreError>;

    /// Every template, ordered by name
    async fn list_templates(&self) -> Result<Vec<Template>, StoreError>;

    async fn delete_template(&self, id: &str) -> Result<bool, StoreError>;

    //
    // COMMENTS
    //

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, StoreError>;

    async fn get_comment(&self, id: &str) -> Result<Option<Comment>, StoreError>;

    async fn replace_comment(&self, comment: Comment) -> Result<Option<Comment>, StoreError>;

    /// Comments of a page, chronological
    async fn list_comments(&self, page_id: &str) -> Result<Vec<Comment>, StoreError>;

    /// Delete a comment and its replies
    async fn delete_comment(&self, id: &str) -> Result<bool, StoreError>;

    //
    // ACTIVITY & VISITS
    //

    async fn append_activity(&self, activity: Activity) -> Result<(), StoreError>;

    /// Newest-first activity of a space
    async fn list_activity(&self, space_id: &str, limit: usize)
        -> Result<Vec<Activity>, StoreError>;

    /// Insert or refresh a (user, page) visit
    async fn upsert_visit(&self, visit: RecentVisit) -> Result<(), StoreError>;

    /// Newest-first visits of a user
    async fn list_visits(&self, user_id: &str, limit: usize)
        -> Result<Vec<RecentVisit>, StoreError>;
}
