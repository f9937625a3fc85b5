//! Page Tree Read Model
//!
//! [`PageTreeNode`] is derived from a flat page list by
//! [`crate::services::tree_builder::build_tree`] and never persisted.

use crate::models::{Page, PageStatus};
use serde::{Deserialize, Serialize};

/// One page in a navigable space hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTreeNode {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: PageStatus,
    pub position: i64,
    /// Children ordered by ascending position
    pub children: Vec<PageTreeNode>,
    pub has_children: bool,
}

impl PageTreeNode {
    /// Build a node for `page` with already-built children
    pub fn from_page(page: &Page, children: Vec<PageTreeNode>) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            slug: page.slug.clone(),
            status: page.status,
            position: page.position,
            has_children: !children.is_empty(),
            children,
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&PageTreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}
