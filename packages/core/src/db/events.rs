//! Domain Events
//!
//! Emitted by the services after a successful write, following the observer
//! pattern: callers subscribe through a tokio broadcast channel and react to
//! data changes without coupling to the service internals.

use crate::models::{Page, Space};

/// Domain-level change notifications
#[derive(Debug, Clone)]
pub enum DomainEvent {
    SpaceCreated(Space),
    SpaceUpdated(Space),
    SpaceDeleted { id: String },
    PageCreated(Page),
    PageUpdated(Page),
    PageMoved(Page),
    PageDeleted {
        id: String,
        space_id: String,
        /// Direct children moved up to the deleted page's parent
        reparented: Vec<String>,
    },
}

impl DomainEvent {
    /// Event type name, useful for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::SpaceCreated(_) => "space:created",
            DomainEvent::SpaceUpdated(_) => "space:updated",
            DomainEvent::SpaceDeleted { .. } => "space:deleted",
            DomainEvent::PageCreated(_) => "page:created",
            DomainEvent::PageUpdated(_) => "page:updated",
            DomainEvent::PageMoved(_) => "page:moved",
            DomainEvent::PageDeleted { .. } => "page:deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = DomainEvent::PageDeleted {
            id: "p1".to_string(),
            space_id: "s1".to_string(),
            reparented: vec!["p2".to_string()],
        };
        assert_eq!(event.event_type(), "page:deleted");
        assert_eq!(
            DomainEvent::SpaceDeleted { id: "s1".to_string() }.event_type(),
            "space:deleted"
        );
    }
}
