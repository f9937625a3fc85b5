//! Content Block Model
//!
//! A page's body is an ordered list of [`ContentBlock`]s. Each block carries a
//! stable identity, its raw text, and a [`BlockKind`] holding only the
//! attributes that make sense for its type.
//!
//! # Wire Format
//!
//! `BlockKind` is flattened into the block and internally tagged, so a level-2
//! heading serializes as:
//!
//! ```json
//! { "id": "…", "type": "heading", "level": 2, "content": "Overview" }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use wikispace_core::models::{BlockKind, ContentBlock};
//!
//! let heading = ContentBlock::new(BlockKind::Heading { level: 2 }, "Overview");
//! let copy = heading.duplicate();
//!
//! assert_ne!(heading.id, copy.id);
//! assert_eq!(heading.kind, copy.kind);
//! assert_eq!(heading.content, copy.content);
//! ```

use crate::models::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of block type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Paragraph,
    Heading,
    List,
    Code,
    Quote,
    Table,
    Image,
    Divider,
    Callout,
    Expand,
    IssueReference,
    IssueMacro,
}

impl BlockType {
    /// All block types in declaration order
    pub const ALL: [BlockType; 12] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::List,
        BlockType::Code,
        BlockType::Quote,
        BlockType::Table,
        BlockType::Image,
        BlockType::Divider,
        BlockType::Callout,
        BlockType::Expand,
        BlockType::IssueReference,
        BlockType::IssueMacro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::List => "list",
            BlockType::Code => "code",
            BlockType::Quote => "quote",
            BlockType::Table => "table",
            BlockType::Image => "image",
            BlockType::Divider => "divider",
            BlockType::Callout => "callout",
            BlockType::Expand => "expand",
            BlockType::IssueReference => "issue-reference",
            BlockType::IssueMacro => "issue-macro",
        }
    }

    /// Whether blocks of this type may hold nested child blocks
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockType::Quote | BlockType::Callout | BlockType::Expand
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_block(format!("unknown block type '{}'", s)))
    }
}

/// List flavour for list blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    #[default]
    Unordered,
    Ordered,
    Task,
}

/// Visual flavour for callout blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    #[default]
    Info,
    Note,
    Success,
    Warning,
    Error,
}

/// Type-specific block attributes, one variant per block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum BlockKind {
    Paragraph,
    Heading {
        level: u8,
    },
    List {
        #[serde(default)]
        list_kind: ListKind,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Quote,
    Table {
        #[serde(default)]
        headers: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
        #[serde(default)]
        has_header: bool,
    },
    Image {
        #[serde(default)]
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Divider,
    Callout {
        #[serde(default)]
        callout_kind: CalloutKind,
    },
    Expand {
        #[serde(default)]
        title: String,
    },
    IssueReference {
        #[serde(default)]
        issue_key: String,
    },
    IssueMacro {
        #[serde(default)]
        query: String,
    },
}

impl BlockKind {
    /// The type tag of this variant
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading { .. } => BlockType::Heading,
            BlockKind::List { .. } => BlockType::List,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Quote => BlockType::Quote,
            BlockKind::Table { .. } => BlockType::Table,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Callout { .. } => BlockType::Callout,
            BlockKind::Expand { .. } => BlockType::Expand,
            BlockKind::IssueReference { .. } => BlockType::IssueReference,
            BlockKind::IssueMacro { .. } => BlockType::IssueMacro,
        }
    }

    /// Default attributes for a block type
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading => BlockKind::Heading { level: 1 },
            BlockType::List => BlockKind::List {
                list_kind: ListKind::default(),
            },
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::Quote => BlockKind::Quote,
            BlockType::Table => BlockKind::Table {
                headers: vec![String::new(); 3],
                rows: vec![vec![String::new(); 3]; 2],
                has_header: true,
            },
            BlockType::Image => BlockKind::Image {
                url: String::new(),
                alt: None,
            },
            BlockType::Divider => BlockKind::Divider,
            BlockType::Callout => BlockKind::Callout {
                callout_kind: CalloutKind::default(),
            },
            BlockType::Expand => BlockKind::Expand {
                title: String::new(),
            },
            BlockType::IssueReference => BlockKind::IssueReference {
                issue_key: String::new(),
            },
            BlockType::IssueMacro => BlockKind::IssueMacro {
                query: String::new(),
            },
        }
    }
}

/// One typed unit of page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    /// Stable identity, preserved across in-place edits
    pub id: String,

    /// Type tag and type-specific attributes
    #[serde(flatten)]
    pub kind: BlockKind,

    /// Raw text content
    #[serde(default)]
    pub content: String,

    /// Nested blocks (container types only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentBlock>,
}

impl ContentBlock {
    /// Create a block with a fresh identity
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// The default block: an empty paragraph
    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph, "")
    }

    /// Attach nested child blocks
    pub fn with_children(mut self, children: Vec<ContentBlock>) -> Self {
        self.children = children;
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Deep copy with fresh identities for this block and every nested child
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: self.kind.clone(),
            content: self.content.clone(),
            children: self.children.iter().map(ContentBlock::duplicate).collect(),
        }
    }

    /// Text of this block followed by its children's text, newline-separated
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.children.len());
        if !self.content.is_empty() {
            parts.push(self.content.clone());
        }
        for child in &self.children {
            let text = child.plain_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join("\n")
    }

    /// Check type-specific attribute constraints
    ///
    /// # Errors
    ///
    /// - Heading level outside 1..=6
    /// - Nested children on a non-container block type
    /// - Empty block id
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("block.id".to_string()));
        }

        if let BlockKind::Heading { level } = self.kind {
            if !(1..=6).contains(&level) {
                return Err(ValidationError::invalid_block(format!(
                    "heading level must be between 1 and 6, got {}",
                    level
                )));
            }
        }

        if !self.children.is_empty() && !self.block_type().is_container() {
            return Err(ValidationError::invalid_block(format!(
                "block type '{}' cannot contain nested blocks",
                self.block_type()
            )));
        }

        self.children.iter().try_for_each(ContentBlock::validate)
    }
}

impl Default for ContentBlock {
    fn default() -> Self {
        Self::paragraph()
    }
}

/// Fresh identities for every block in a list (used when seeding from templates)
pub fn reissue_block_ids(blocks: &[ContentBlock]) -> Vec<ContentBlock> {
    blocks.iter().map(ContentBlock::duplicate).collect()
}
