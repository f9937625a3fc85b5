//! WikiSpace Core
//!
//! Document engine for a hierarchical wiki: spaces hold trees of pages, and
//! pages are ordered lists of typed content blocks.
//!
//! # Modules
//!
//! - [`models`] - Data structures (Space, Page, ContentBlock, PageTreeNode, ...)
//! - [`db`] - Storage contract (`DocumentStore`) and the in-memory store
//! - [`services`] - Business services (SpaceService, PageService, CollaborationService)
//!   plus the pure tree builder and search
//! - [`editor`] - Block editor state machine, slash commands and the save boundary
//! - [`config`] - Engine configuration
//! - [`logging`] - Tracing subscriber setup
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wikispace_core::{
//!     CreatePageInput, CreateSpaceInput, EngineConfig, InMemoryStore, SpaceType, WikiServices,
//! };
//!
//! # tokio_test::block_on(async {
//! let services = WikiServices::new(Arc::new(InMemoryStore::new()), EngineConfig::default());
//! let space = services
//!     .spaces
//!     .create_space(
//!         CreateSpaceInput {
//!             key: "eng".to_string(),
//!             name: "Engineering".to_string(),
//!             description: String::new(),
//!             space_type: SpaceType::Team,
//!         },
//!         "alice",
//!     )
//!     .await
//!     .unwrap();
//! let page = services
//!     .pages
//!     .create_page(CreatePageInput::new(&space.id, "Onboarding"), "alice")
//!     .await
//!     .unwrap();
//!
//! let tree = services.pages.build_page_tree(&space.id).await.unwrap();
//! assert_eq!(tree[0].id, page.id);
//! # });
//! ```

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::EngineConfig;
pub use db::{DocumentStore, DomainEvent, InMemoryStore, StoreError};
pub use editor::{EditIntent, EditorSession, EditorState, SaveError};
pub use models::*;
pub use services::*;
