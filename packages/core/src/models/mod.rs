//! Data Models
//!
//! This module contains the core data structures used throughout WikiSpace:
//!
//! - `Space` - Top-level collection of pages
//! - `Page` - Hierarchical document composed of `ContentBlock`s
//! - `ContentBlock` / `BlockKind` - Typed unit of page content
//! - `PageTreeNode` - Derived navigation tree
//! - `PageVersion` - Immutable revision snapshot
//! - `Label`, `Template`, `Comment`, `Activity`, `RecentVisit` - Collaboration data

mod activity;
mod block;
mod comment;
mod label;
mod page;
mod space;
mod template;
mod tree;
mod validation;
mod version;

pub use activity::{Activity, ActivityKind, RecentVisit};
pub use block::{reissue_block_ids, BlockKind, BlockType, CalloutKind, ContentBlock, ListKind};
pub use comment::Comment;
pub use label::{normalize_label_name, Label, LabelColor};
pub use page::{
    generate_slug, next_position, Breadcrumb, CreatePageInput, MovePageInput, Page, PageDetails,
    PageStatus, PageUpdate, FALLBACK_SLUG,
};
pub use space::{CreateSpaceInput, Space, SpaceStatus, SpaceType, SpaceUpdate};
pub use template::Template;
pub use tree::PageTreeNode;
pub use validation::{normalize_space_key, validate_title, ValidationError};
pub use version::PageVersion;
