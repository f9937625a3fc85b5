//! Space Service
//!
//! Creation, lookup, update and soft deletion of spaces. A space with
//! `status = deleted` stays in the store but is invisible to every read path
//! here and in [`crate::services::PageService`].

use crate::config::EngineConfig;
use crate::db::{DocumentStore, DomainEvent};
use crate::models::{
    normalize_space_key, validate_title, Activity, ActivityKind, CreateSpaceInput, Space,
    SpaceStatus, SpaceUpdate, ValidationError,
};
use crate::services::collaboration_service::record_activity;
use crate::services::error::ServiceError;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Space CRUD with soft deletion
#[derive(Clone)]
pub struct SpaceService {
    store: Arc<dyn DocumentStore>,
    config: Arc<EngineConfig>,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl SpaceService {
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

    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Create an active space
    ///
    /// The key is trimmed and uppercased, then must match `^[A-Z][A-Z0-9]{1,9}$`
    /// and not collide with another non-deleted space. A deleted space's key
    /// can be reused.
    ///
    /// # Errors
    ///
    /// - `ValidationError::InvalidSpaceKey` / `DuplicateSpaceKey`
    /// - `ValidationError::EmptyTitle` / `TitleTooLong` for the name
    /// - `ServiceError::Persistence` if the store write fails
    pub async fn create_space(
        &self,
        input: CreateSpaceInput,
        actor: &str,
    ) -> Result<Space, ServiceError> {
        let key = normalize_space_key(&input.key)?;
        let name = validate_title(&input.name, self.config.max_title_length)?;

        if let Some(existing) = self.store.find_space_by_key(&key).await? {
            if !existing.is_deleted() {
                return Err(ValidationError::DuplicateSpaceKey(key).into());
            }
        }

        let space = Space::new(
            key,
            name,
            input.description.trim().to_string(),
            input.space_type,
            actor,
        );
        let space = self.store.insert_space(space).await?;

        tracing::info!("Created space {} ({})", space.key, space.id);
        record_activity(
            self.store.as_ref(),
            Activity::new(
                &space.id,
                None,
                actor,
                ActivityKind::SpaceCreated,
                format!("Created space {}", space.name),
            ),
        )
        .await;
        self.emit_event(DomainEvent::SpaceCreated(space.clone()));

        Ok(space)
    }

    /// Non-deleted spaces, ordered by key
    pub async fn list_spaces(&self) -> Result<Vec<Space>, ServiceError> {
        let spaces = self.store.list_spaces().await?;
        Ok(spaces.into_iter().filter(|s| !s.is_deleted()).collect())
    }

    /// Look up a space by key, case-insensitively
    pub async fn get_space_by_key(&self, key: &str) -> Result<Option<Space>, ServiceError> {
        let key = key.trim().to_uppercase();
        if key.is_empty() {
            return Ok(None);
        }
        let space = self.store.find_space_by_key(&key).await?;
        Ok(space.filter(|s| !s.is_deleted()))
    }

    pub async fn get_space_by_id(&self, id: &str) -> Result<Option<Space>, ServiceError> {
        let space = self.store.get_space(id).await?;
        Ok(space.filter(|s| !s.is_deleted()))
    }

    /// Apply a sparse update; `Ok(None)` if the space is missing or deleted
    ///
    /// A home page must be a page of this space.
    pub async fn update_space(
        &self,
        id: &str,
        update: SpaceUpdate,
        actor: &str,
    ) -> Result<Option<Space>, ServiceError> {
        let Some(mut space) = self.get_space_by_id(id).await? else {
            return Ok(None);
        };

        if update.is_empty() {
            return Ok(Some(space));
        }

        if let Some(name) = update.name {
            space.name = validate_title(&name, self.config.max_title_length)?;
        }
        if let Some(description) = update.description {
            space.description = description.trim().to_string();
        }
        if let Some(space_type) = update.space_type {
            space.space_type = space_type;
        }
        if let Some(status) = update.status {
            space.status = status;
        }
        if let Some(home_page_id) = update.home_page_id {
            if let Some(page_id) = home_page_id.as_deref() {
                let in_space = self
                    .store
                    .get_page(page_id)
                    .await?
                    .is_some_and(|p| p.space_id == space.id);
                if !in_space {
                    return Err(ServiceError::invalid_reference(format!(
                        "home page {} is not a page of space {}",
                        page_id, space.key
                    )));
                }
            }
            space.home_page_id = home_page_id;
        }

        space.updated_by = actor.to_string();
        space.updated_at = Utc::now();

        let Some(space) = self.store.replace_space(space).await? else {
            return Ok(None);
        };

        tracing::debug!("Updated space {}", space.key);
        let (kind, verb) = if space.is_deleted() {
            (ActivityKind::SpaceDeleted, "Deleted")
        } else {
            (ActivityKind::SpaceUpdated, "Updated")
        };
        record_activity(
            self.store.as_ref(),
            Activity::new(
                &space.id,
                None,
                actor,
                kind,
                format!("{} space {}", verb, space.name),
            ),
        )
        .await;
        if space.is_deleted() {
            self.emit_event(DomainEvent::SpaceDeleted {
                id: space.id.clone(),
            });
        } else {
            self.emit_event(DomainEvent::SpaceUpdated(space.clone()));
        }

        Ok(Some(space))
    }

    /// Mark a space archived; it stays readable
    pub async fn archive_space(
        &self,
        id: &str,
        actor: &str,
    ) -> Result<Option<Space>, ServiceError> {
        let update = SpaceUpdate {
            status: Some(SpaceStatus::Archived),
            ..Default::default()
        };
        self.update_space(id, update, actor).await
    }

    /// Soft-delete a space
    ///
    /// # Returns
    ///
    /// `false` if the space does not exist or was already deleted
    pub async fn delete_space(&self, id: &str, actor: &str) -> Result<bool, ServiceError> {
        let update = SpaceUpdate {
            status: Some(SpaceStatus::Deleted),
            ..Default::default()
        };
        let deleted = self.update_space(id, update, actor).await?;
        if deleted.is_some() {
            tracing::info!("Soft-deleted space {}", id);
        }
        Ok(deleted.is_some())
    }
}
