//! Storage Layer
//!
//! WikiSpace delegates durable storage to an injected collaborator. This
//! module defines that contract and ships an in-memory implementation:
//!
//! - [`DocumentStore`] - async trait every backend implements
//! - [`InMemoryStore`] - instance-owned maps, used for tests and embedding
//! - [`StoreError`] - persistence failures
//! - [`DomainEvent`] - change notifications emitted by the services
//!
//! There is no process-wide datastore: every service receives its store as
//! an `Arc<dyn DocumentStore>`.

mod error;
pub mod events;
mod memory_store;
mod store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use memory_store::InMemoryStore;
pub use store::DocumentStore;
