//! Collaboration Service
//!
//! The smaller page- and space-scoped sub-APIs around the document model:
//! labels, templates, comments, the activity feed and recently visited pages.

use crate::config::EngineConfig;
use crate::db::DocumentStore;
use crate::models::{
    normalize_label_name, validate_title, Activity, ActivityKind, Comment, ContentBlock, Label,
    LabelColor, Page, RecentVisit, Template, ValidationError,
};
use crate::services::error::ServiceError;
use chrono::Utc;
use std::sync::Arc;

/// Append an activity entry, logging instead of failing
///
/// Activity is recorded after the primary write has succeeded, so a failure
/// here must not turn that write into an error.
pub(crate) async fn record_activity(store: &dyn DocumentStore, activity: Activity) {
    if let Err(e) = store.append_activity(activity).await {
        tracing::warn!("Failed to record activity: {}", e);
    }
}

/// Labels, templates, comments, activity and visits
#[derive(Clone)]
pub struct CollaborationService {
    store: Arc<dyn DocumentStore>,
    config: Arc<EngineConfig>,
}

impl CollaborationService {
    pub fn new(store: Arc<dyn DocumentStore>, config: Arc<EngineConfig>) -> Self {
        Self { store, config }
    }

    async fn space_is_visible(&self, space_id: &str) -> Result<bool, ServiceError> {
        Ok(self
            .store
            .get_space(space_id)
            .await?
            .is_some_and(|s| !s.is_deleted()))
    }

    async fn require_page(&self, page_id: &str) -> Result<Page, ServiceError> {
        self.store
            .get_page(page_id)
            .await?
            .ok_or_else(|| ServiceError::invalid_reference(format!("page {} not found", page_id)))
    }

    //
    // LABELS
    //

    /// Create a space-scoped label
    ///
    /// Names are trimmed and lowercased, and must be unique within the space.
    pub async fn create_label(
        &self,
        space_id: &str,
        name: &str,
        color: LabelColor,
    ) -> Result<Label, ServiceError> {
        if !self.space_is_visible(space_id).await? {
            return Err(ServiceError::invalid_reference(format!(
                "space {} not found",
                space_id
            )));
        }

        let name = normalize_label_name(name);
        if name.is_empty() {
            return Err(ValidationError::invalid_label("label name cannot be empty").into());
        }

        let existing = self.store.list_labels(space_id).await?;
        if existing.iter().any(|l| l.name == name) {
            return Err(ValidationError::invalid_label(format!(
                "label '{}' already exists in this space",
                name
            ))
            .into());
        }

        let label = self
            .store
            .insert_label(Label::new(space_id.to_string(), name, color))
            .await?;
        tracing::debug!("Created label {} in space {}", label.name, space_id);
        Ok(label)
    }

    pub async fn list_labels(&self, space_id: &str) -> Result<Vec<Label>, ServiceError> {
        Ok(self.store.list_labels(space_id).await?)
    }

    /// Attach a label to a page of the same space
    ///
    /// # Returns
    ///
    /// `true` if newly attached, `false` if it was already attached
    pub async fn add_label_to_page(
        &self,
        page_id: &str,
        label_id: &str,
    ) -> Result<bool, ServiceError> {
        let page = self.require_page(page_id).await?;
        let label = self.store.get_label(label_id).await?.ok_or_else(|| {
            ServiceError::invalid_reference(format!("label {} not found", label_id))
        })?;

        if label.space_id != page.space_id {
            return Err(ValidationError::invalid_label(format!(
                "label '{}' belongs to another space",
                label.name
            ))
            .into());
        }

        Ok(self.store.attach_label(page_id, label_id).await?)
    }

    pub async fn remove_label_from_page(
        &self,
        page_id: &str,
        label_id: &str,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.detach_label(page_id, label_id).await?)
    }

    pub async fn labels_for_page(&self, page_id: &str) -> Result<Vec<Label>, ServiceError> {
        Ok(self.store.labels_for_page(page_id).await?)
    }

    /// Pages carrying a label, in store order
    pub async fn pages_with_label(&self, label_id: &str) -> Result<Vec<Page>, ServiceError> {
        let ids = self.store.pages_with_label(label_id).await?;
        let mut pages = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(page) = self.store.get_page(&id).await? {
                pages.push(page);
            }
        }
        Ok(pages)
    }

    //
    // TEMPLATES
    //

    /// Create a template, scoped to a space or global when `space_id` is `None`
    pub async fn create_template(
        &self,
        space_id: Option<&str>,
        name: &str,
        description: &str,
        content: Vec<ContentBlock>,
        actor: &str,
    ) -> Result<Template, ServiceError> {
        let name = validate_title(name, self.config.max_title_length)?;
        if let Some(space_id) = space_id {
            if !self.space_is_visible(space_id).await? {
                return Err(ServiceError::invalid_reference(format!(
                    "space {} not found",
                    space_id
                )));
            }
        }

        content.iter().try_for_each(ContentBlock::validate)?;
        let content = if content.is_empty() {
            vec![ContentBlock::paragraph()]
        } else {
            content
        };

        let template = Template::new(
            space_id.map(str::to_string),
            name,
            description.trim().to_string(),
            content,
            actor,
        );
        Ok(self.store.insert_template(template).await?)
    }

    /// Templates usable in a space: its own plus global ones, ordered by name
    pub async fn list_templates(&self, space_id: &str) -> Result<Vec<Template>, ServiceError> {
        let templates = self.store.list_templates().await?;
        Ok(templates
            .into_iter()
            .filter(|t| t.is_available_in(space_id))
            .collect())
    }

    pub async fn get_template(&self, id: &str) -> Result<Option<Template>, ServiceError> {
        Ok(self.store.get_template(id).await?)
    }

    pub async fn delete_template(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.store.delete_template(id).await?)
    }

    //
    // COMMENTS
    //

    /// Add a comment, optionally replying to another comment on the same page
    pub async fn add_comment(
        &self,
        page_id: &str,
        author: &str,
        body: &str,
        parent_comment_id: Option<&str>,
    ) -> Result<Comment, ServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::MissingField("body".to_string()).into());
        }

        let page = self.require_page(page_id).await?;

        if let Some(parent_id) = parent_comment_id {
            let parent_ok = self
                .store
                .get_comment(parent_id)
                .await?
                .is_some_and(|c| c.page_id == page_id);
            if !parent_ok {
                return Err(ServiceError::invalid_reference(format!(
                    "comment {} is not on page {}",
                    parent_id, page_id
                )));
            }
        }

        let comment = self
            .store
            .insert_comment(Comment::new(
                page_id.to_string(),
                author,
                body.to_string(),
                parent_comment_id.map(str::to_string),
            ))
            .await?;

        record_activity(
            self.store.as_ref(),
            Activity::new(
                &page.space_id,
                Some(&page.id),
                author,
                ActivityKind::CommentAdded,
                format!("Commented on {}", page.title),
            ),
        )
        .await;

        Ok(comment)
    }

    /// Comments of a page, oldest first
    pub async fn list_comments(&self, page_id: &str) -> Result<Vec<Comment>, ServiceError> {
        Ok(self.store.list_comments(page_id).await?)
    }

    /// Mark a comment resolved; `Ok(None)` if it does not exist
    pub async fn resolve_comment(&self, id: &str) -> Result<Option<Comment>, ServiceError> {
        let Some(mut comment) = self.store.get_comment(id).await? else {
            return Ok(None);
        };
        if comment.resolved {
            return Ok(Some(comment));
        }
        comment.resolved = true;
        comment.updated_at = Utc::now();
        Ok(self.store.replace_comment(comment).await?)
    }

    /// Delete a comment and its replies
    pub async fn delete_comment(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.store.delete_comment(id).await?)
    }

    //
    // ACTIVITY & VISITS
    //

    /// Newest-first activity of a space; `limit` defaults to `activity_feed_limit`
    pub async fn recent_activity(
        &self,
        space_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Activity>, ServiceError> {
        let limit = limit.unwrap_or(self.config.activity_feed_limit);
        Ok(self.store.list_activity(space_id, limit).await?)
    }

    /// Record that `user_id` opened a page
    ///
    /// Repeat visits refresh the timestamp instead of adding entries.
    ///
    /// # Returns
    ///
    /// `false` if the page does not exist
    pub async fn record_visit(&self, user_id: &str, page_id: &str) -> Result<bool, ServiceError> {
        if self.store.get_page(page_id).await?.is_none() {
            return Ok(false);
        }
        self.store
            .upsert_visit(RecentVisit {
                user_id: user_id.to_string(),
                page_id: page_id.to_string(),
                visited_at: Utc::now(),
            })
            .await?;
        Ok(true)
    }

    /// Newest-first visits; `limit` defaults to `recent_visits_limit`
    pub async fn recent_visits(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RecentVisit>, ServiceError> {
        let limit = limit.unwrap_or(self.config.recent_visits_limit);
        Ok(self.store.list_visits(user_id, limit).await?)
    }
}
