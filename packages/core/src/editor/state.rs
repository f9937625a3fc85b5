//! Editor State and Reducers
//!
//! [`EditorState`] owns the live block list of one editing session. Every
//! change goes through [`EditorState::apply`] with an [`EditIntent`]; the
//! reducers are synchronous, never fail, and treat out-of-range indices as
//! no-ops.
//!
//! # Invariants
//!
//! - The block list is never empty; deleting the last block is refused
//! - `selected_index`, when set, points at an existing block
//! - Structural changes (insert, delete, move, duplicate) close the slash menu
//!
//! # Examples
//!
//! ```rust
//! use wikispace_core::editor::{EditIntent, EditorState};
//!
//! let mut state = EditorState::from_blocks(Vec::new());
//! state.apply(EditIntent::InsertAfter(0));
//! state.apply(EditIntent::set_content(1, "/head"));
//!
//! assert_eq!(state.blocks.len(), 2);
//! assert!(state.slash_menu.open);
//! assert_eq!(state.slash_menu.query, "head");
//! ```

use crate::editor::intent::EditIntent;
use crate::editor::slash::{SlashCommand, SlashCommandRegistry, SlashMenuNavigator};
use crate::models::{ContentBlock, Page};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direction for [`EditorState::move_block`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Where the caret sits on screen, used to anchor the slash menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub x: f32,
    pub y: f32,
}

impl ScreenPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Slash command menu state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlashMenuState {
    pub open: bool,

    /// Text typed after the leading `/`
    pub query: String,

    /// Block the chosen command will convert
    pub target_index: Option<usize>,

    pub screen_position: Option<ScreenPosition>,

    pub navigator: SlashMenuNavigator,
}

impl SlashMenuState {
    pub fn highlighted(&self) -> usize {
        self.navigator.highlighted()
    }

    fn close(&mut self) {
        *self = Self::default();
    }
}

/// In-memory draft of one page's content
#[derive(Debug, Clone)]
pub struct EditorState {
    pub blocks: Vec<ContentBlock>,
    pub selected_index: Option<usize>,

    /// Set by every block mutation; cleared only by a successful save
    pub is_dirty: bool,

    pub slash_menu: SlashMenuState,

    registry: Arc<SlashCommandRegistry>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::from_blocks(Vec::new())
    }
}

impl EditorState {
    /// Start editing a block list with the built-in slash catalog
    ///
    /// An empty list becomes a single empty paragraph.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::with_registry(blocks, Arc::new(SlashCommandRegistry::default()))
    }

    pub fn from_page(page: &Page) -> Self {
        Self::from_blocks(page.content.clone())
    }

    pub fn with_registry(mut blocks: Vec<ContentBlock>, registry: Arc<SlashCommandRegistry>) -> Self {
        if blocks.is_empty() {
            blocks.push(ContentBlock::paragraph());
        }
        Self {
            blocks,
            selected_index: None,
            is_dirty: false,
            slash_menu: SlashMenuState::default(),
            registry,
        }
    }

    pub fn registry(&self) -> &SlashCommandRegistry {
        &self.registry
    }

    pub fn selected_block(&self) -> Option<&ContentBlock> {
        self.selected_index.and_then(|i| self.blocks.get(i))
    }

    /// Commands matching the current slash query, in catalog order
    pub fn slash_results(&self) -> Vec<&SlashCommand> {
        self.registry.filter(&self.slash_menu.query)
    }

    /// The command under the menu highlight, if the menu is open
    pub fn highlighted_command(&self) -> Option<&SlashCommand> {
        if !self.slash_menu.open {
            return None;
        }
        self.slash_results()
            .get(self.slash_menu.highlighted())
            .copied()
    }

    /// Reduce one intent into the state
    ///
    /// # Returns
    ///
    /// `true` if the block list changed. Selection and menu-only intents
    /// return `false`.
    pub fn apply(&mut self, intent: EditIntent) -> bool {
        match intent {
            EditIntent::InsertAfter(index) => self.insert_block_after(index),
            EditIntent::Delete(index) => self.delete_block(index),
            EditIntent::MoveUp(index) => self.move_block(index, MoveDirection::Up),
            EditIntent::MoveDown(index) => self.move_block(index, MoveDirection::Down),
            EditIntent::Duplicate(index) => self.duplicate_block(index),
            EditIntent::SetContent {
                index,
                text,
                caret_position,
            } => self.set_block_content(index, text, caret_position),
            EditIntent::OpenSlashMenu { index, position } => {
                self.open_slash_menu(index, String::new(), position);
                false
            }
            EditIntent::ApplySlashCommand(command_id) => self.apply_slash_command(&command_id),
            EditIntent::HighlightNext => {
                self.slash_menu.navigator.next();
                false
            }
            EditIntent::HighlightPrevious => {
                self.slash_menu.navigator.previous();
                false
            }
            EditIntent::CloseSlashMenu => {
                self.slash_menu.close();
                false
            }
            EditIntent::Select(index) => {
                self.select(index);
                false
            }
            EditIntent::SelectPrevious => {
                if let Some(i) = self.selected_index.filter(|i| *i > 0) {
                    self.selected_index = Some(i - 1);
                }
                false
            }
            EditIntent::SelectNext => {
                if let Some(i) = self.selected_index.filter(|i| i + 1 < self.blocks.len()) {
                    self.selected_index = Some(i + 1);
                }
                false
            }
        }
    }

    /// Insert a fresh paragraph after `index` and select it
    pub fn insert_block_after(&mut self, index: usize) -> bool {
        if index >= self.blocks.len() {
            return false;
        }
        self.blocks.insert(index + 1, ContentBlock::paragraph());
        self.after_structural_change(index + 1);
        true
    }

    /// Remove the block at `index`, refusing to remove the last block
    pub fn delete_block(&mut self, index: usize) -> bool {
        if self.blocks.len() <= 1 || index >= self.blocks.len() {
            return false;
        }
        self.blocks.remove(index);
        self.after_structural_change(index.saturating_sub(1));
        true
    }

    /// Swap the block with its neighbour; no-op at either end
    pub fn move_block(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.blocks.len() => index + 1,
            _ => return false,
        };
        if index >= self.blocks.len() {
            return false;
        }
        self.blocks.swap(index, target);
        self.after_structural_change(target);
        true
    }

    /// Deep copy the block (fresh ids) directly after itself and select the copy
    pub fn duplicate_block(&mut self, index: usize) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        let copy = block.duplicate();
        self.blocks.insert(index + 1, copy);
        self.after_structural_change(index + 1);
        true
    }

    /// Overwrite a block's text, driving the slash menu from a leading `/`
    pub fn set_block_content(
        &mut self,
        index: usize,
        text: String,
        caret_position: Option<ScreenPosition>,
    ) -> bool {
        let Some(block) = self.blocks.get_mut(index) else {
            return false;
        };

        let query = text.strip_prefix('/').map(str::to_string);
        block.content = text;
        self.is_dirty = true;

        match query {
            Some(query) => self.open_slash_menu(index, query, caret_position),
            None if self.slash_menu.target_index == Some(index) => self.slash_menu.close(),
            None => {}
        }
        true
    }

    /// Convert the menu's target block into the command's block type
    ///
    /// The block keeps its id; content is cleared and nested children are
    /// dropped unless the new type is a container.
    pub fn apply_slash_command(&mut self, command_id: &str) -> bool {
        let Some(index) = self.slash_menu.target_index.filter(|_| self.slash_menu.open) else {
            return false;
        };
        let Some(kind) = self.registry.get(command_id).map(|c| c.kind.clone()) else {
            tracing::debug!("Unknown slash command '{}'", command_id);
            return false;
        };
        let Some(block) = self.blocks.get_mut(index) else {
            self.slash_menu.close();
            return false;
        };

        block.kind = kind;
        block.content.clear();
        if !block.block_type().is_container() {
            block.children.clear();
        }

        self.slash_menu.close();
        self.selected_index = Some(index);
        self.is_dirty = true;
        true
    }

    pub fn select(&mut self, index: usize) {
        if index < self.blocks.len() {
            self.selected_index = Some(index);
        }
    }

    fn open_slash_menu(&mut self, index: usize, query: String, position: Option<ScreenPosition>) {
        if index >= self.blocks.len() {
            return;
        }
        let reopening = !self.slash_menu.open || self.slash_menu.target_index != Some(index);
        let result_count = self.registry.filter(&query).len();

        if reopening {
            self.slash_menu.navigator = SlashMenuNavigator::new(result_count);
        } else {
            self.slash_menu.navigator.sync(result_count);
        }
        self.slash_menu.open = true;
        self.slash_menu.query = query;
        self.slash_menu.target_index = Some(index);
        if position.is_some() {
            self.slash_menu.screen_position = position;
        }
    }

    fn after_structural_change(&mut self, selected: usize) {
        self.selected_index = Some(selected);
        self.is_dirty = true;
        self.slash_menu.close();
    }
}
