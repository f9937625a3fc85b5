//! Business Services
//!
//! This module contains the business logic over a [`DocumentStore`]:
//!
//! - `SpaceService` - Space CRUD with soft deletion
//! - `PageService` - Page CRUD, hierarchy, version history and search
//! - `CollaborationService` - Labels, templates, comments, activity, visits
//! - `tree_builder` - Pure flat-list → forest construction and ancestor walks
//! - `search` - Pure title search with excerpts and highlighting
//!
//! Services coordinate between the store and callers, implementing business
//! rules and publishing [`DomainEvent`]s after successful writes.

pub mod collaboration_service;
pub mod error;
pub mod page_service;
pub mod search;
pub mod space_service;
pub mod tree_builder;

pub use collaboration_service::CollaborationService;
pub use error::ServiceError;
pub use page_service::{PageService, SaveTarget};
pub use search::{SearchOptions, SearchResult};
pub use space_service::SpaceService;
pub use tree_builder::{build_tree, TreeError};

use crate::config::EngineConfig;
use crate::db::{DocumentStore, DomainEvent};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for domain events.
///
/// Slow subscribers lag rather than block writers.
pub(crate) const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// All services wired to one store, one config and one event channel
#[derive(Clone)]
pub struct WikiServices {
    pub spaces: SpaceService,
    pub pages: PageService,
    pub collaboration: CollaborationService,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl WikiServices {
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            spaces: SpaceService::with_event_sender(
                store.clone(),
                config.clone(),
                event_tx.clone(),
            ),
            pages: PageService::with_event_sender(store.clone(), config.clone(), event_tx.clone()),
            collaboration: CollaborationService::new(store, config),
            event_tx,
        }
    }

    /// Receive space and page events from every service
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }
}
