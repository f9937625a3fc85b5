//! Page Tree Builder
//!
//! Turns a flat list of pages (each holding a `parent_id` back-pointer) into
//! an ordered forest of [`PageTreeNode`]s, and walks ancestor chains for
//! breadcrumbs.
//!
//! # Algorithm
//!
//! 1. One pass over the input builds an adjacency list: parent id → children
//! 2. Each child group is sorted by position (ties: `created_at`, then id)
//! 3. Roots are walked depth-first with an explicit stack, so deep chains
//!    never grow the call stack
//!
//! Pages whose parent is not part of the input (missing, archived, or in
//! another space) become roots rather than disappearing. A parent chain that
//! loops back on itself is never reachable from a root; after the walk, any
//! page left unvisited is reported as [`TreeError::CycleDetected`].
//!
//! # Examples
//!
//! ```rust
//! use wikispace_core::models::Page;
//! use wikispace_core::services::tree_builder::build_tree;
//!
//! let a = Page::new("s".into(), "A".into(), None, 0, Vec::new(), "u");
//! let b = Page::new("s".into(), "B".into(), None, 1, Vec::new(), "u");
//! let c = Page::new("s".into(), "C".into(), Some(a.id.clone()), 0, Vec::new(), "u");
//!
//! let tree = build_tree(&[c, b, a], 100).unwrap();
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree[0].title, "A");
//! assert_eq!(tree[0].children[0].title, "C");
//! assert_eq!(tree[1].title, "B");
//! ```

use crate::models::{Page, PageTreeNode};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Hierarchy corruption found while traversing parent pointers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Cycle detected in page hierarchy: {}", .page_ids.join(" -> "))]
    CycleDetected { page_ids: Vec<String> },

    #[error("Page hierarchy deeper than {max_depth} levels at page {page_id}")]
    DepthExceeded { page_id: String, max_depth: usize },
}

impl TreeError {
    pub fn cycle_detected(page_ids: Vec<String>) -> Self {
        Self::CycleDetected { page_ids }
    }

    pub fn depth_exceeded(page_id: impl Into<String>, max_depth: usize) -> Self {
        Self::DepthExceeded {
            page_id: page_id.into(),
            max_depth,
        }
    }
}

/// Sibling order: position, then creation time, then id
pub fn sibling_order(a: &Page, b: &Page) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Parent id → children (sorted by [`sibling_order`]), plus the roots
struct AdjacencyIndex<'a> {
    roots: Vec<&'a Page>,
    children: HashMap<&'a str, Vec<&'a Page>>,
}

impl<'a> AdjacencyIndex<'a> {
    fn new(pages: &'a [Page]) -> Self {
        let ids: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();

        let mut roots = Vec::new();
        let mut children: HashMap<&str, Vec<&Page>> = HashMap::new();
        for page in pages {
            match page.parent_id.as_deref() {
                Some(parent) if ids.contains(parent) => {
                    children.entry(parent).or_default().push(page)
                }
                _ => roots.push(page),
            }
        }

        roots.sort_by(|a, b| sibling_order(a, b));
        for group in children.values_mut() {
            group.sort_by(|a, b| sibling_order(a, b));
        }

        Self { roots, children }
    }

    fn children_of(&self, id: &str) -> &[&'a Page] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the ordered page forest for one space
///
/// `pages` should already exclude archived pages; children of an excluded
/// page are promoted to roots.
///
/// # Errors
///
/// - [`TreeError::CycleDetected`] when some pages' parent chains form a loop
/// - [`TreeError::DepthExceeded`] when nesting goes beyond `max_depth` levels
pub fn build_tree(pages: &[Page], max_depth: usize) -> Result<Vec<PageTreeNode>, TreeError> {
    let index = AdjacencyIndex::new(pages);
    let mut visited = 0usize;

    let mut forest = Vec::with_capacity(index.roots.len());
    let mut stack: Vec<OpenNode<'_, '_>> = Vec::new();
    for &root in &index.roots {
        stack.push(OpenNode::enter(root, 1, &index, max_depth, &mut visited)?);

        while let Some(open) = stack.last_mut() {
            if let Some(&child) = open.pending.next() {
                let depth = open.depth + 1;
                stack.push(OpenNode::enter(child, depth, &index, max_depth, &mut visited)?);
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let node = PageTreeNode::from_page(done.page, done.children);
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => forest.push(node),
            }
        }
    }

    if visited < pages.len() {
        let reachable: HashSet<&str> = collect_ids(&forest);
        let mut stranded: Vec<String> = pages
            .iter()
            .filter(|p| !reachable.contains(p.id.as_str()))
            .map(|p| p.id.clone())
            .collect();
        stranded.sort();
        tracing::warn!(
            "Page hierarchy contains a cycle: {} pages unreachable from any root",
            stranded.len()
        );
        return Err(TreeError::cycle_detected(stranded));
    }

    Ok(forest)
}

/// A page whose children are still being built
struct OpenNode<'i, 'a> {
    page: &'a Page,
    depth: usize,
    pending: std::slice::Iter<'i, &'a Page>,
    children: Vec<PageTreeNode>,
}

impl<'i, 'a> OpenNode<'i, 'a> {
    fn enter(
        page: &'a Page,
        depth: usize,
        index: &'i AdjacencyIndex<'a>,
        max_depth: usize,
        visited: &mut usize,
    ) -> Result<Self, TreeError> {
        if depth > max_depth {
            return Err(TreeError::depth_exceeded(page.id.clone(), max_depth));
        }
        *visited += 1;

        let pending = index.children_of(&page.id).iter();
        Ok(Self {
            page,
            depth,
            children: Vec::with_capacity(pending.len()),
            pending,
        })
    }
}

fn collect_ids(forest: &[PageTreeNode]) -> HashSet<&str> {
    let mut ids = HashSet::new();
    let mut stack: Vec<&PageTreeNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        ids.insert(node.id.as_str());
        stack.extend(node.children.iter());
    }
    ids
}

/// Ancestors of `page`, root first, excluding the page itself
///
/// `lookup` resolves a page id; a parent that does not resolve ends the walk.
///
/// # Errors
///
/// - [`TreeError::CycleDetected`] when the chain revisits a page
/// - [`TreeError::DepthExceeded`] when the chain is longer than `max_depth`
pub fn ancestors<'a, F>(page: &'a Page, lookup: F, max_depth: usize) -> Result<Vec<&'a Page>, TreeError>
where
    F: Fn(&str) -> Option<&'a Page>,
{
    let mut seen: Vec<&str> = vec![page.id.as_str()];
    let mut chain: Vec<&Page> = Vec::new();
    let mut current = page;

    while let Some(parent_id) = current.parent_id.as_deref() {
        if seen.contains(&parent_id) {
            let mut page_ids: Vec<String> = seen.iter().map(|id| id.to_string()).collect();
            page_ids.push(parent_id.to_string());
            tracing::warn!("Cycle in ancestor chain of page {}", page.id);
            return Err(TreeError::cycle_detected(page_ids));
        }

        let Some(parent) = lookup(parent_id) else {
            break;
        };

        if chain.len() >= max_depth {
            return Err(TreeError::depth_exceeded(page.id.clone(), max_depth));
        }

        seen.push(parent_id);
        chain.push(parent);
        current = parent;
    }

    chain.reverse();
    Ok(chain)
}

/// Ids of `root_id` and every page below it
///
/// Walks the adjacency list breadth-first; pages caught in a cycle are
/// visited once.
pub fn subtree_ids(root_id: &str, pages: &[Page]) -> HashSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for page in pages {
        if let Some(parent) = page.parent_id.as_deref() {
            children.entry(parent).or_default().push(page.id.as_str());
        }
    }

    let mut ids = HashSet::new();
    let mut queue = std::collections::VecDeque::from([root_id]);
    while let Some(id) = queue.pop_front() {
        if !ids.insert(id.to_string()) {
            continue;
        }
        if let Some(kids) = children.get(id) {
            queue.extend(kids.iter().copied());
        }
    }
    ids
}
