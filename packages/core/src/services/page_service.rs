//! Page Service - Page CRUD, Hierarchy and Version History
//!
//! This module provides the business logic for pages:
//!
//! - CRUD operations (create, read, update, delete)
//! - Hierarchy management (move with sibling renumbering, delete with
//!   reparenting, tree construction, breadcrumbs)
//! - Version history (snapshot on every content-affecting update, restore)
//! - Title search
//!
//! # Visibility
//!
//! A page is visible only while its space exists and is not deleted. Every
//! read path returns `Ok(None)` (or an empty collection) for invisible
//! records instead of an error.
//!
//! # Versioning
//!
//! Every successful [`PageService::update_page`] is content-affecting: the
//! store bumps `version` by exactly 1 and appends a snapshot of the
//! post-update title and content in the same write. Moves are positional and
//! never bump the version. Page creation records no snapshot.

use crate::config::EngineConfig;
use crate::db::{DocumentStore, DomainEvent};
use crate::models::{
    generate_slug, next_position, reissue_block_ids, validate_title, Activity, ActivityKind,
    Breadcrumb, ContentBlock, CreatePageInput, MovePageInput, Page, PageDetails, PageStatus,
    PageTreeNode, PageUpdate, PageVersion, Space, ValidationError,
};
use crate::services::collaboration_service::record_activity;
use crate::services::error::ServiceError;
use crate::services::search::{self, SearchOptions, SearchResult};
use crate::services::tree_builder::{self, sibling_order};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Target status of a whole-document save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Status stays or becomes draft
    Draft,
    /// Status becomes published and `published_at` is stamped on transition
    Published,
}

impl SaveTarget {
    pub fn status(self) -> PageStatus {
        match self {
            SaveTarget::Draft => PageStatus::Draft,
            SaveTarget::Published => PageStatus::Published,
        }
    }
}

/// Page business logic over an injected [`DocumentStore`]
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn DocumentStore>,
    config: Arc<EngineConfig>,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<DomainEvent>,
}

impl PageService {
    /// Create a new PageService
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use wikispace_core::config::EngineConfig;
    /// # use wikispace_core::db::InMemoryStore;
    /// # use wikispace_core::services::PageService;
    /// # use std::sync::Arc;
    /// let store = Arc::new(InMemoryStore::new());
    /// let pages = PageService::new(store, Arc::new(EngineConfig::default()));
    /// let mut rx = pages.subscribe_to_events();
    /// ```
    pub fn new(store: Arc<dyn DocumentStore>, config: Arc<EngineConfig>) -> Self {
        let (event_tx, _) = broadcast::channel(super::DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self::with_event_sender(store, config, event_tx)
    }

    /// Build a service that publishes on an existing event channel
    pub fn with_event_sender(
        store: Arc<dyn DocumentStore>,
        config: Arc<EngineConfig>,
        event_tx: broadcast::Sender<DomainEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_tx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to page (and, on a shared channel, space) events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors when nobody is subscribed
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn visible_space(&self, space_id: &str) -> Result<Option<Space>, ServiceError> {
        let space = self.store.get_space(space_id).await?;
        Ok(space.filter(|s| !s.is_deleted()))
    }

    async fn require_space(&self, space_id: &str) -> Result<Space, ServiceError> {
        self.visible_space(space_id).await?.ok_or_else(|| {
            ServiceError::invalid_reference(format!("space {} not found", space_id))
        })
    }

    /// Pick a slug for `title`, suffixing `-2`, `-3`, ... when unique slugs
    /// are enforced and the base slug is taken by another page of the space
    fn choose_slug(&self, title: &str, taken: &HashSet<String>) -> String {
        let base = generate_slug(title);
        if !self.config.enforce_unique_slugs || !taken.contains(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(base)
    }

    async fn taken_slugs(
        &self,
        space_id: &str,
        exclude: &HashSet<String>,
    ) -> Result<HashSet<String>, ServiceError> {
        if !self.config.enforce_unique_slugs {
            return Ok(HashSet::new());
        }
        Ok(self
            .store
            .list_pages_in_space(space_id)
            .await?
            .into_iter()
            .filter(|p| !exclude.contains(&p.id))
            .map(|p| p.slug)
            .collect())
    }

    fn normalize_content(content: Vec<ContentBlock>) -> Result<Vec<ContentBlock>, ServiceError> {
        content.iter().try_for_each(ContentBlock::validate)?;
        if content.is_empty() {
            Ok(vec![ContentBlock::paragraph()])
        } else {
            Ok(content)
        }
    }

    async fn log_activity(&self, page: &Page, actor: &str, kind: ActivityKind, summary: String) {
        record_activity(
            self.store.as_ref(),
            Activity::new(&page.space_id, Some(&page.id), actor, kind, summary),
        )
        .await;
    }

    //
    // CREATE
    //

    /// Create a draft page
    ///
    /// The page lands after its existing siblings (`max(position) + 1`, or 0).
    /// Content comes from `input.content`, else from the template (with fresh
    /// block ids), else a single empty paragraph.
    ///
    /// # Errors
    ///
    /// - `ValidationError::EmptyTitle` / `TitleTooLong`
    /// - `ValidationError::InvalidReference` for a missing or deleted space,
    ///   or a template not available in the space
    /// - `ValidationError::InvalidParent` when the parent is missing or in
    ///   another space
    /// - `ValidationError::InvalidBlock` for malformed content
    pub async fn create_page(
        &self,
        input: CreatePageInput,
        actor: &str,
    ) -> Result<Page, ServiceError> {
        let title = validate_title(&input.title, self.config.max_title_length)?;
        let space = self.require_space(&input.space_id).await?;

        if let Some(parent_id) = input.parent_id.as_deref() {
            let parent_ok = self
                .store
                .get_page(parent_id)
                .await?
                .is_some_and(|p| p.space_id == space.id);
            if !parent_ok {
                return Err(ValidationError::invalid_parent(format!(
                    "parent page {} not found in space {}",
                    parent_id, space.key
                ))
                .into());
            }
        }

        let content = match (input.content, input.template_id.as_deref()) {
            (Some(content), _) => Self::normalize_content(content)?,
            (None, Some(template_id)) => {
                let template = self
                    .store
                    .get_template(template_id)
                    .await?
                    .filter(|t| t.is_available_in(&space.id))
                    .ok_or_else(|| {
                        ServiceError::invalid_reference(format!(
                            "template {} not available in space {}",
                            template_id, space.key
                        ))
                    })?;
                reissue_block_ids(&template.content)
            }
            (None, None) => Vec::new(),
        };

        // Position is assigned by the store under the same write as the insert
        let mut page = Page::new(space.id.clone(), title, input.parent_id, 0, content, actor);
        if self.config.enforce_unique_slugs {
            let taken = self.taken_slugs(&space.id, &HashSet::new()).await?;
            page.slug = self.choose_slug(&page.title, &taken);
        }

        let page = self.store.insert_page_at_end(page).await?;

        tracing::info!(
            "Created page '{}' ({}) in space {} at position {}",
            page.title,
            page.id,
            space.key,
            page.position
        );
        self.log_activity(
            &page,
            actor,
            ActivityKind::PageCreated,
            format!("Created {}", page.title),
        )
        .await;
        self.emit_event(DomainEvent::PageCreated(page.clone()));

        Ok(page)
    }

    //
    // READ
    //

    /// Raw page by id, if its space is visible
    pub async fn get_page(&self, id: &str) -> Result<Option<Page>, ServiceError> {
        let Some(page) = self.store.get_page(id).await? else {
            return Ok(None);
        };
        if self.visible_space(&page.space_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(page))
    }

    /// Page enriched with breadcrumbs, counts and labels
    pub async fn get_page_by_id(&self, id: &str) -> Result<Option<PageDetails>, ServiceError> {
        match self.get_page(id).await? {
            Some(page) => Ok(Some(self.page_details(page).await?)),
            None => Ok(None),
        }
    }

    /// Page by space key and slug
    ///
    /// Slugs are not unique by default; the lowest-positioned,
    /// earliest-created match wins.
    pub async fn get_page_by_slug(
        &self,
        space_key: &str,
        slug: &str,
    ) -> Result<Option<PageDetails>, ServiceError> {
        let key = space_key.trim().to_uppercase();
        let Some(space) = self
            .store
            .find_space_by_key(&key)
            .await?
            .filter(|s| !s.is_deleted())
        else {
            return Ok(None);
        };

        let page = self
            .store
            .list_pages_in_space(&space.id)
            .await?
            .into_iter()
            .filter(|p| p.slug == slug)
            .min_by(sibling_order);

        match page {
            Some(page) => Ok(Some(self.page_details(page).await?)),
            None => Ok(None),
        }
    }

    async fn page_details(&self, page: Page) -> Result<PageDetails, ServiceError> {
        let space_pages = self.store.list_pages_in_space(&page.space_id).await?;
        let by_id: HashMap<&str, &Page> =
            space_pages.iter().map(|p| (p.id.as_str(), p)).collect();

        let breadcrumbs = tree_builder::ancestors(
            &page,
            |id| by_id.get(id).copied(),
            self.config.max_hierarchy_depth,
        )?
        .into_iter()
        .map(Breadcrumb::from)
        .collect();

        let child_count = space_pages
            .iter()
            .filter(|p| p.parent_id.as_deref() == Some(page.id.as_str()) && !p.is_archived())
            .count();
        let comment_count = self.store.list_comments(&page.id).await?.len();
        let labels = self
            .store
            .labels_for_page(&page.id)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();

        Ok(PageDetails {
            author_id: page.created_by.clone(),
            editor_id: page.updated_by.clone(),
            breadcrumbs,
            child_count,
            comment_count,
            attachment_count: 0,
            labels,
            page,
        })
    }

    /// Non-archived pages of a visible space, in store order
    pub async fn list_pages_by_space(&self, space_id: &str) -> Result<Vec<Page>, ServiceError> {
        if self.visible_space(space_id).await?.is_none() {
            return Ok(Vec::new());
        }
        let pages = self.store.list_pages_in_space(space_id).await?;
        Ok(pages.into_iter().filter(|p| !p.is_archived()).collect())
    }

    //
    // UPDATE
    //

    /// Apply a content-affecting update
    ///
    /// Bumps the version by exactly 1 and records a post-update snapshot in
    /// the same store write. A title change re-derives the slug; the first
    /// transition to published stamps `published_at`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the page is missing or its space is deleted
    ///
    /// # Errors
    ///
    /// - `ServiceError::VersionConflict` when `expected_version` is set and
    ///   the stored page has moved on
    /// - `ServiceError::Validation` for a bad title or content
    pub async fn update_page(
        &self,
        id: &str,
        update: PageUpdate,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        let Some(mut page) = self.get_page(id).await? else {
            return Ok(None);
        };

        if let Some(expected) = update.expected_version {
            if expected != page.version {
                tracing::warn!(
                    "Rejected stale update of page {}: expected v{}, found v{}",
                    id,
                    expected,
                    page.version
                );
                return Err(ServiceError::version_conflict(id, expected, page.version));
            }
        }

        let previous_status = page.status;

        if let Some(title) = update.title {
            let title = validate_title(&title, self.config.max_title_length)?;
            if title != page.title {
                let exclude = HashSet::from([page.id.clone()]);
                let taken = self.taken_slugs(&page.space_id, &exclude).await?;
                page.slug = self.choose_slug(&title, &taken);
                page.title = title;
            }
        }
        if let Some(content) = update.content {
            page.content = Self::normalize_content(content)?;
        }
        if let Some(status) = update.status {
            page.status = status;
        }

        let now = Utc::now();
        if page.status == PageStatus::Published && previous_status != PageStatus::Published {
            page.published_at = Some(now);
        }
        page.updated_by = actor.to_string();
        page.updated_at = now;

        let Some(page) = self
            .store
            .commit_page_revision(page, update.change_message, update.expected_version)
            .await?
        else {
            return Ok(None);
        };

        let published =
            page.status == PageStatus::Published && previous_status != PageStatus::Published;
        tracing::info!("Updated page {} to version {}", page.id, page.version);
        let (kind, summary) = if published {
            (ActivityKind::PagePublished, format!("Published {}", page.title))
        } else {
            (ActivityKind::PageUpdated, format!("Updated {}", page.title))
        };
        self.log_activity(&page, actor, kind, summary).await;
        self.emit_event(DomainEvent::PageUpdated(page.clone()));

        Ok(Some(page))
    }

    /// Whole-document write of an editor's block list
    ///
    /// `target` decides the resulting status. `expected_version` is passed
    /// through to [`PageService::update_page`] unchanged.
    pub async fn save_blocks(
        &self,
        id: &str,
        blocks: Vec<ContentBlock>,
        target: SaveTarget,
        expected_version: Option<i64>,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        let update = PageUpdate {
            content: Some(blocks),
            status: Some(target.status()),
            expected_version,
            ..Default::default()
        };
        self.update_page(id, update, actor).await
    }

    /// Save as draft
    pub async fn save_draft(
        &self,
        id: &str,
        blocks: Vec<ContentBlock>,
        expected_version: Option<i64>,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        self.save_blocks(id, blocks, SaveTarget::Draft, expected_version, actor)
            .await
    }

    /// Save and publish
    pub async fn publish(
        &self,
        id: &str,
        blocks: Vec<ContentBlock>,
        expected_version: Option<i64>,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        self.save_blocks(id, blocks, SaveTarget::Published, expected_version, actor)
            .await
    }

    //
    // HIERARCHY
    //

    /// Move a page under a new parent and/or into another space
    ///
    /// The page is inserted at `target_position` (clamped) among its new
    /// siblings, and that sibling group is renumbered `0..n`. Moving into
    /// another space carries the whole subtree along. The version is not
    /// bumped.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the page is missing or its space is deleted
    ///
    /// # Errors
    ///
    /// - `ValidationError::CircularReference` when the target parent is the
    ///   page itself or one of its descendants
    /// - `ValidationError::InvalidParent` when the target parent does not
    ///   exist in the target space
    /// - `ValidationError::InvalidReference` for a missing target space
    pub async fn move_page(
        &self,
        id: &str,
        input: MovePageInput,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        let Some(mut page) = self.get_page(id).await? else {
            return Ok(None);
        };

        let source_space_id = page.space_id.clone();
        let target_space_id = input
            .target_space
            .clone()
            .unwrap_or_else(|| source_space_id.clone());
        let target_space = self.require_space(&target_space_id).await?;
        let cross_space = target_space.id != source_space_id;

        let source_pages = self.store.list_pages_in_space(&source_space_id).await?;
        let subtree = tree_builder::subtree_ids(&page.id, &source_pages);

        if let Some(parent_id) = input.target_parent.as_deref() {
            if subtree.contains(parent_id) {
                return Err(ValidationError::circular_reference(id, parent_id).into());
            }
            let parent_ok = self
                .store
                .get_page(parent_id)
                .await?
                .is_some_and(|p| p.space_id == target_space.id);
            if !parent_ok {
                return Err(ValidationError::invalid_parent(format!(
                    "parent page {} not found in space {}",
                    parent_id, target_space.key
                ))
                .into());
            }
        }

        let target_pages = if cross_space {
            self.store.list_pages_in_space(&target_space.id).await?
        } else {
            source_pages.clone()
        };

        let mut siblings: Vec<Page> = target_pages
            .iter()
            .filter(|p| p.parent_id == input.target_parent && p.id != page.id)
            .cloned()
            .collect();
        siblings.sort_by(sibling_order);

        let index = input.target_position.clamp(0, siblings.len() as i64) as usize;

        let now = Utc::now();
        page.parent_id = input.target_parent.clone();
        page.space_id = target_space.id.clone();
        page.updated_by = actor.to_string();
        page.updated_at = now;
        siblings.insert(index, page);

        let mut changed: Vec<Page> = Vec::with_capacity(siblings.len());
        for (position, mut sibling) in siblings.into_iter().enumerate() {
            let position = position as i64;
            if sibling.id == id || sibling.position != position {
                sibling.position = position;
                changed.push(sibling);
            }
        }

        if cross_space {
            let mut taken = self.taken_slugs(&target_space.id, &subtree).await?;
            for moved in changed.iter_mut().filter(|p| p.id == id) {
                moved.slug = self.choose_slug(&moved.title, &taken);
                taken.insert(moved.slug.clone());
            }
            for mut descendant in source_pages
                .into_iter()
                .filter(|p| p.id != id && subtree.contains(&p.id))
            {
                descendant.space_id = target_space.id.clone();
                descendant.slug = self.choose_slug(&descendant.title, &taken);
                taken.insert(descendant.slug.clone());
                changed.push(descendant);
            }
        }

        self.store.replace_pages(changed).await?;

        let Some(moved) = self.store.get_page(id).await? else {
            return Ok(None);
        };

        tracing::info!(
            "Moved page {} to position {} under {:?} in space {}",
            moved.id,
            moved.position,
            moved.parent_id,
            target_space.key
        );
        self.log_activity(
            &moved,
            actor,
            ActivityKind::PageMoved,
            format!("Moved {}", moved.title),
        )
        .await;
        self.emit_event(DomainEvent::PageMoved(moved.clone()));

        Ok(Some(moved))
    }

    /// Delete a page, lifting its direct children one level
    ///
    /// Children take the deleted page's parent and are appended after that
    /// parent's existing children, keeping their relative order. The page's
    /// versions, label links, comments and visits go with it.
    ///
    /// # Returns
    ///
    /// `false` if the page is missing or its space is deleted
    pub async fn delete_page(&self, id: &str, actor: &str) -> Result<bool, ServiceError> {
        let Some(page) = self.get_page(id).await? else {
            return Ok(false);
        };

        let space_pages = self.store.list_pages_in_space(&page.space_id).await?;

        let mut children: Vec<Page> = space_pages
            .iter()
            .filter(|p| p.parent_id.as_deref() == Some(id))
            .cloned()
            .collect();
        children.sort_by(sibling_order);

        let start = next_position(
            space_pages
                .iter()
                .filter(|p| p.parent_id == page.parent_id && p.id != page.id)
                .map(|p| p.position),
        );

        let now = Utc::now();
        for (offset, child) in children.iter_mut().enumerate() {
            child.parent_id = page.parent_id.clone();
            child.position = start + offset as i64;
            child.updated_by = actor.to_string();
            child.updated_at = now;
        }
        let reparented: Vec<String> = children.iter().map(|c| c.id.clone()).collect();

        if !self.store.remove_page(id, children).await? {
            return Ok(false);
        }

        tracing::info!(
            "Deleted page {} and reparented {} children",
            id,
            reparented.len()
        );
        self.log_activity(
            &page,
            actor,
            ActivityKind::PageDeleted,
            format!("Deleted {}", page.title),
        )
        .await;
        self.emit_event(DomainEvent::PageDeleted {
            id: page.id,
            space_id: page.space_id,
            reparented,
        });

        Ok(true)
    }

    /// Navigable page forest of a space (archived pages excluded)
    ///
    /// # Errors
    ///
    /// `ServiceError::Corruption` when the stored hierarchy has a cycle or
    /// exceeds `max_hierarchy_depth`
    pub async fn build_page_tree(&self, space_id: &str) -> Result<Vec<PageTreeNode>, ServiceError> {
        let pages = self.list_pages_by_space(space_id).await?;
        let tree = tree_builder::build_tree(&pages, self.config.max_hierarchy_depth)?;
        Ok(tree)
    }

    /// Ancestors of a page, root first; empty for a missing page
    pub async fn get_breadcrumbs(&self, page_id: &str) -> Result<Vec<Breadcrumb>, ServiceError> {
        let Some(page) = self.get_page(page_id).await? else {
            return Ok(Vec::new());
        };
        let space_pages = self.store.list_pages_in_space(&page.space_id).await?;
        let by_id: HashMap<&str, &Page> =
            space_pages.iter().map(|p| (p.id.as_str(), p)).collect();

        let chain = tree_builder::ancestors(
            &page,
            |id| by_id.get(id).copied(),
            self.config.max_hierarchy_depth,
        )?;
        Ok(chain.into_iter().map(Breadcrumb::from).collect())
    }

    //
    // VERSION HISTORY
    //

    /// Snapshots of a page, newest first
    pub async fn list_versions(&self, page_id: &str) -> Result<Vec<PageVersion>, ServiceError> {
        let mut versions = self.store.list_versions(page_id).await?;
        versions.reverse();
        Ok(versions)
    }

    pub async fn get_version(
        &self,
        page_id: &str,
        version: i64,
    ) -> Result<Option<PageVersion>, ServiceError> {
        let versions = self.store.list_versions(page_id).await?;
        Ok(versions.into_iter().find(|v| v.version == version))
    }

    /// Bring back a snapshot's title and content as a new version
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the page or the requested version does not exist
    pub async fn restore_version(
        &self,
        page_id: &str,
        version: i64,
        actor: &str,
    ) -> Result<Option<Page>, ServiceError> {
        let Some(snapshot) = self.get_version(page_id, version).await? else {
            return Ok(None);
        };

        let update = PageUpdate::title(snapshot.title)
            .with_message(format!("Restored version {}", version));
        let update = PageUpdate {
            content: Some(snapshot.content),
            ..update
        };
        self.update_page(page_id, update, actor).await
    }

    //
    // SEARCH
    //

    /// Title search over non-archived pages of non-deleted spaces
    pub async fn search_pages(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let live_spaces: HashSet<String> = self
            .store
            .list_spaces()
            .await?
            .into_iter()
            .filter(|s| !s.is_deleted())
            .map(|s| s.id)
            .collect();

        let pages = self.store.list_all_pages().await?;
        let candidates = pages
            .iter()
            .filter(|p| !p.is_archived() && live_spaces.contains(&p.space_id));

        Ok(search::search_pages(
            candidates,
            query,
            options,
            &self.config,
        ))
    }
}

#[cfg(test)]
#[path = "page_service_test.rs"]
mod page_service_test;

#[cfg(test)]
#[path = "page_service_hierarchy_test.rs"]
mod page_service_hierarchy_test;
