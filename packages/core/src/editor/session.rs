//! Editor Session - Save/Publish Boundary
//!
//! An [`EditorSession`] wraps one page's [`EditorState`] and is the only
//! place the editor talks to the [`PageService`]. Saves are whole-document
//! writes and run in two phases so in-memory editing can continue while a
//! write is outstanding:
//!
//! 1. [`EditorSession::begin_save`] snapshots the block list into a
//!    [`SaveRequest`] and marks the session as saving
//! 2. [`EditorSession::complete_save`] takes the store's result
//!
//! A second `begin_save` while a request is outstanding is rejected with
//! [`SaveError::AlreadySaving`]. A failed save leaves the draft and its dirty
//! flag untouched and records the failure in [`EditorSession::last_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! # use wikispace_core::editor::EditorSession;
//! # use wikispace_core::editor::EditIntent;
//! # use wikispace_core::services::PageService;
//! # async fn example(pages: PageService, page_id: &str) -> anyhow::Result<()> {
//! let Some(mut session) = EditorSession::open(pages, page_id, "alice").await? else {
//!     return Ok(());
//! };
//! session.apply(EditIntent::set_content(0, "First draft"));
//! session.save().await?;
//! session.publish().await?;
//! # Ok(())
//! # }
//! ```

use crate::editor::intent::EditIntent;
use crate::editor::state::EditorState;
use crate::models::{ContentBlock, Page, PageStatus};
use crate::services::{PageService, SaveTarget, ServiceError};
use thiserror::Error;

/// Save/publish failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("A save is already in progress for page {0}")]
    AlreadySaving(String),

    #[error("No unsaved changes for page {0}")]
    NothingToSave(String),

    #[error("Page {0} no longer exists")]
    PageMissing(String),

    #[error("Save request {revision} is not the outstanding request")]
    StaleRequest { revision: u64 },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl SaveError {
    /// Whether retrying later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SaveError::AlreadySaving(_) => true,
            SaveError::Service(ServiceError::Persistence(_)) => true,
            _ => false,
        }
    }
}

/// Snapshot handed to the store by [`EditorSession::begin_save`]
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub page_id: String,
    pub blocks: Vec<ContentBlock>,
    pub target: SaveTarget,
    pub expected_version: Option<i64>,

    /// Edit counter at snapshot time
    pub revision: u64,
}

/// One user's editing session on one page
pub struct EditorSession {
    pages: PageService,
    page_id: String,
    actor: String,
    state: EditorState,

    /// Version of the page as last loaded or saved
    loaded_version: i64,
    status: PageStatus,

    /// Incremented by every intent that changes the block list
    revision: u64,
    in_flight: Option<u64>,
    last_error: Option<SaveError>,
}

impl EditorSession {
    /// Load a page into a new session
    ///
    /// Returns `Ok(None)` if the page is missing or its space is deleted.
    pub async fn open(
        pages: PageService,
        page_id: &str,
        actor: &str,
    ) -> Result<Option<Self>, ServiceError> {
        let page = pages.get_page(page_id).await?;
        Ok(page.map(|page| Self::from_page(pages, &page, actor)))
    }

    pub fn from_page(pages: PageService, page: &Page, actor: &str) -> Self {
        Self {
            pages,
            page_id: page.id.clone(),
            actor: actor.to_string(),
            state: EditorState::from_page(page),
            loaded_version: page.version,
            status: page.status,
            revision: 0,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn loaded_version(&self) -> i64 {
        self.loaded_version
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&SaveError> {
        self.last_error.as_ref()
    }

    /// Reduce an intent into the draft
    ///
    /// Allowed while a save is outstanding.
    pub fn apply(&mut self, intent: EditIntent) -> bool {
        let changed = self.state.apply(intent);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Snapshot the draft for a whole-document write
    ///
    /// # Errors
    ///
    /// - `AlreadySaving` if a previous request has not completed
    /// - `NothingToSave` for a draft save with no unsaved edits; publishing a
    ///   clean draft is allowed
    pub fn begin_save(&mut self, target: SaveTarget) -> Result<SaveRequest, SaveError> {
        if self.in_flight.is_some() {
            tracing::warn!("Rejected save of page {}: already saving", self.page_id);
            return Err(SaveError::AlreadySaving(self.page_id.clone()));
        }
        if target == SaveTarget::Draft && !self.state.is_dirty {
            return Err(SaveError::NothingToSave(self.page_id.clone()));
        }

        let detect_conflicts = self.pages.config().detect_version_conflicts;
        self.in_flight = Some(self.revision);

        Ok(SaveRequest {
            page_id: self.page_id.clone(),
            blocks: self.state.blocks.clone(),
            target,
            expected_version: detect_conflicts.then_some(self.loaded_version),
            revision: self.revision,
        })
    }

    /// Record the outcome of a request from [`Self::begin_save`]
    ///
    /// On success the session adopts the stored version and status; the
    /// dirty flag clears only if nothing was edited after the snapshot. On
    /// failure the draft is left exactly as it was.
    pub fn complete_save(
        &mut self,
        request: &SaveRequest,
        result: Result<Option<Page>, ServiceError>,
    ) -> Result<Page, SaveError> {
        if self.in_flight != Some(request.revision) || request.page_id != self.page_id {
            return Err(SaveError::StaleRequest {
                revision: request.revision,
            });
        }
        self.in_flight = None;

        let outcome = match result {
            Ok(Some(page)) => Ok(page),
            Ok(None) => Err(SaveError::PageMissing(self.page_id.clone())),
            Err(e) => Err(SaveError::from(e)),
        };

        match outcome {
            Ok(page) => {
                self.loaded_version = page.version;
                self.status = page.status;
                if self.revision == request.revision {
                    self.state.is_dirty = false;
                }
                self.last_error = None;
                tracing::debug!(
                    "Saved page {} as {:?} at version {}",
                    page.id,
                    page.status,
                    page.version
                );
                Ok(page)
            }
            Err(e) => {
                tracing::warn!("Save of page {} failed: {}", self.page_id, e);
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Save the draft, keeping or returning the page to draft status
    pub async fn save(&mut self) -> Result<Page, SaveError> {
        self.run_save(SaveTarget::Draft).await
    }

    /// Save and publish the draft
    pub async fn publish(&mut self) -> Result<Page, SaveError> {
        self.run_save(SaveTarget::Published).await
    }

    async fn run_save(&mut self, target: SaveTarget) -> Result<Page, SaveError> {
        let request = self.begin_save(target)?;
        let result = self
            .pages
            .save_blocks(
                &request.page_id,
                request.blocks.clone(),
                request.target,
                request.expected_version,
                &self.actor,
            )
            .await;
        self.complete_save(&request, result)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
