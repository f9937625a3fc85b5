//! Slash Command Registry
//!
//! Catalog of block definitions a user can insert or convert into by typing
//! `/` at the start of a block, plus the filtering, grouping and keyboard
//! navigation used by the command menu.
//!
//! Filtering is a case-insensitive substring match on label or description
//! and always preserves catalog order.
//!
//! # Examples
//!
//! ```rust
//! use wikispace_core::editor::{SlashCategory, SlashCommandRegistry};
//!
//! let registry = SlashCommandRegistry::default();
//! let headings = registry.filter("head");
//!
//! assert_eq!(headings[0].id, "heading1");
//! assert!(headings.iter().all(|c| c.category == SlashCategory::Text));
//! ```

use crate::models::{BlockKind, BlockType, CalloutKind, ListKind};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Display group of a slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlashCategory {
    Text,
    List,
    Media,
    Advanced,
}

impl SlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlashCategory::Text => "text",
            SlashCategory::List => "list",
            SlashCategory::Media => "media",
            SlashCategory::Advanced => "advanced",
        }
    }
}

/// One insertable block definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub category: SlashCategory,

    /// Target block type and its default attributes
    pub kind: BlockKind,
}

impl SlashCommand {
    fn new(
        id: &'static str,
        label: &'static str,
        description: &'static str,
        category: SlashCategory,
        kind: BlockKind,
    ) -> Self {
        Self {
            id,
            label,
            description,
            category,
            kind,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Case-insensitive substring match on label or description
    ///
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

static BUILTIN_COMMANDS: LazyLock<Vec<SlashCommand>> = LazyLock::new(|| {
    use SlashCategory::*;

    vec![
        SlashCommand::new("text", "Text", "Start writing with plain text", Text, BlockKind::Paragraph),
        SlashCommand::new("heading1", "Heading 1", "Large section title", Text, BlockKind::Heading { level: 1 }),
        SlashCommand::new("heading2", "Heading 2", "Medium section title", Text, BlockKind::Heading { level: 2 }),
        SlashCommand::new("heading3", "Heading 3", "Small section title", Text, BlockKind::Heading { level: 3 }),
        SlashCommand::new("quote", "Quote", "Capture a quotation", Text, BlockKind::Quote),
        SlashCommand::new(
            "bulleted-list",
            "Bulleted list",
            "Create a simple bulleted list",
            List,
            BlockKind::List { list_kind: ListKind::Unordered },
        ),
        SlashCommand::new(
            "numbered-list",
            "Numbered list",
            "Create a list with numbering",
            List,
            BlockKind::List { list_kind: ListKind::Ordered },
        ),
        SlashCommand::new(
            "task-list",
            "Task list",
            "Track action items with checkboxes",
            List,
            BlockKind::List { list_kind: ListKind::Task },
        ),
        SlashCommand::new(
            "image",
            "Image",
            "Embed an image from a URL",
            Media,
            BlockKind::default_for(BlockType::Image),
        ),
        SlashCommand::new(
            "table",
            "Table",
            "Organize data in rows and columns",
            Media,
            BlockKind::default_for(BlockType::Table),
        ),
        SlashCommand::new("divider", "Divider", "Visually separate sections", Media, BlockKind::Divider),
        SlashCommand::new("code", "Code block", "Capture a code snippet", Advanced, BlockKind::Code { language: None }),
        SlashCommand::new(
            "info-panel",
            "Info panel",
            "Call out important information",
            Advanced,
            BlockKind::Callout { callout_kind: CalloutKind::Info },
        ),
        SlashCommand::new(
            "warning-panel",
            "Warning panel",
            "Warn readers about something",
            Advanced,
            BlockKind::Callout { callout_kind: CalloutKind::Warning },
        ),
        SlashCommand::new(
            "expand",
            "Expand",
            "Hide content in a collapsible section",
            Advanced,
            BlockKind::default_for(BlockType::Expand),
        ),
        SlashCommand::new(
            "issue-reference",
            "Issue link",
            "Reference a single issue by key",
            Advanced,
            BlockKind::default_for(BlockType::IssueReference),
        ),
        SlashCommand::new(
            "issue-macro",
            "Issue query",
            "Embed issues matching a query",
            Advanced,
            BlockKind::default_for(BlockType::IssueMacro),
        ),
    ]
});

/// An ordered catalog of slash commands
#[derive(Debug, Clone, PartialEq)]
pub struct SlashCommandRegistry {
    commands: Vec<SlashCommand>,
}

impl Default for SlashCommandRegistry {
    /// The built-in catalog
    fn default() -> Self {
        Self::new(BUILTIN_COMMANDS.clone())
    }
}

impl SlashCommandRegistry {
    pub fn new(commands: Vec<SlashCommand>) -> Self {
        Self { commands }
    }

    /// Every command in catalog order
    pub fn commands(&self) -> &[SlashCommand] {
        &self.commands
    }

    pub fn get(&self, id: &str) -> Option<&SlashCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Commands matching `query`, in catalog order
    ///
    /// An empty query returns the full catalog. Any other query, whitespace
    /// included, is a case-insensitive substring of the label or description.
    /// Matching is not ranked.
    pub fn filter(&self, query: &str) -> Vec<&SlashCommand> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return self.commands.iter().collect();
        }
        self.commands.iter().filter(|c| c.matches(&needle)).collect()
    }
}

/// Partition filtered commands by category for display
///
/// Groups appear in the order their category is first encountered in
/// `commands`; commands keep their relative order within a group.
pub fn group_by_category<'a>(
    commands: &[&'a SlashCommand],
) -> Vec<(SlashCategory, Vec<&'a SlashCommand>)> {
    let mut groups: Vec<(SlashCategory, Vec<&'a SlashCommand>)> = Vec::new();
    for &command in commands {
        match groups.iter_mut().find(|(category, _)| *category == command.category) {
            Some((_, members)) => members.push(command),
            None => groups.push((command.category, vec![command])),
        }
    }
    groups
}

/// What a key press on the open menu asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Highlight moved to this index
    Highlight(usize),
    /// Apply the command at this index
    Select(usize),
    /// Close without a selection
    Close,
}

/// Keys the menu reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// Highlight tracking over the filtered, flattened command list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlashMenuNavigator {
    highlighted: usize,
    result_count: usize,
}

impl SlashMenuNavigator {
    pub fn new(result_count: usize) -> Self {
        Self {
            highlighted: 0,
            result_count,
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    /// Track a new filtered result count
    ///
    /// The highlight returns to the first entry whenever the count changes.
    pub fn sync(&mut self, result_count: usize) {
        if result_count != self.result_count {
            self.result_count = result_count;
            self.highlighted = 0;
        }
    }

    pub fn next(&mut self) {
        if self.result_count > 0 {
            self.highlighted = (self.highlighted + 1) % self.result_count;
        }
    }

    pub fn previous(&mut self) {
        if self.result_count > 0 {
            self.highlighted = (self.highlighted + self.result_count - 1) % self.result_count;
        }
    }

    /// Apply a key press
    ///
    /// Enter on an empty result list selects nothing and closes the menu.
    pub fn handle_key(&mut self, key: MenuKey) -> MenuAction {
        match key {
            MenuKey::Down => {
                self.next();
                MenuAction::Highlight(self.highlighted)
            }
            MenuKey::Up => {
                self.previous();
                MenuAction::Highlight(self.highlighted)
            }
            MenuKey::Enter if self.result_count > 0 => MenuAction::Select(self.highlighted),
            MenuKey::Enter | MenuKey::Escape => MenuAction::Close,
        }
    }
}
