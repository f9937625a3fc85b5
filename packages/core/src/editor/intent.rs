//! Edit Intents and Keyboard Translation
//!
//! [`EditIntent`] is the closed set of changes the editor understands. Input
//! bindings stay outside the reducers: [`translate_key`] turns a key press on
//! the selected block into at most one intent, routing keys to the slash
//! menu while it is open.

use crate::editor::slash::{MenuAction, MenuKey};
use crate::editor::state::{EditorState, ScreenPosition};

/// A discrete change to an [`EditorState`]
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    InsertAfter(usize),
    Delete(usize),
    MoveUp(usize),
    MoveDown(usize),
    Duplicate(usize),
    SetContent {
        index: usize,
        text: String,
        caret_position: Option<ScreenPosition>,
    },
    /// Open the menu on a block without typing a `/`
    OpenSlashMenu {
        index: usize,
        position: Option<ScreenPosition>,
    },
    /// Convert the menu's target block; carries a command id
    ApplySlashCommand(String),
    HighlightNext,
    HighlightPrevious,
    CloseSlashMenu,
    Select(usize),
    SelectPrevious,
    SelectNext,
}

impl EditIntent {
    /// Content change without a caret position
    pub fn set_content(index: usize, text: impl Into<String>) -> Self {
        EditIntent::SetContent {
            index,
            text: text.into(),
            caret_position: None,
        }
    }
}

/// Keys the editor binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    Escape,
    Char(char),
}

/// Modifier keys held during a press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// A key press on the selected block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::none(),
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Caret location inside the selected block's text, in characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caret {
    pub offset: usize,
}

impl Caret {
    pub fn at(offset: usize) -> Self {
        Self { offset }
    }

    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn is_at_end(&self, text: &str) -> bool {
        self.offset >= text.chars().count()
    }
}

/// Map a key press to an intent
///
/// With the slash menu open, arrows move the highlight, Enter applies the
/// highlighted command and Escape closes the menu. Otherwise:
///
/// - Enter without modifiers inserts a block after the current one
/// - Backspace on an empty block deletes it when others remain
/// - ArrowUp at the start of the text selects the previous block
/// - ArrowDown at the end of the text selects the next block
///
/// Returns `None` when the key should keep its default text behaviour.
pub fn translate_key(input: KeyInput, caret: Caret, state: &EditorState) -> Option<EditIntent> {
    if state.slash_menu.open {
        return translate_menu_key(input, state);
    }

    let index = state.selected_index?;
    let block = state.blocks.get(index)?;

    match input.key {
        Key::Enter if input.modifiers.is_empty() => Some(EditIntent::InsertAfter(index)),
        Key::Backspace if block.content.is_empty() && state.blocks.len() > 1 => {
            Some(EditIntent::Delete(index))
        }
        Key::ArrowUp if caret.is_at_start() => Some(EditIntent::SelectPrevious),
        Key::ArrowDown if caret.is_at_end(&block.content) => Some(EditIntent::SelectNext),
        _ => None,
    }
}

fn translate_menu_key(input: KeyInput, state: &EditorState) -> Option<EditIntent> {
    let key = match input.key {
        Key::ArrowUp => MenuKey::Up,
        Key::ArrowDown => MenuKey::Down,
        Key::Enter => MenuKey::Enter,
        Key::Escape => MenuKey::Escape,
        Key::Backspace | Key::Char(_) => return None,
    };

    // Work on a copy; the reducer owns the real highlight
    let mut navigator = state.slash_menu.navigator;
    match navigator.handle_key(key) {
        MenuAction::Highlight(_) if key == MenuKey::Up => Some(EditIntent::HighlightPrevious),
        MenuAction::Highlight(_) => Some(EditIntent::HighlightNext),
        MenuAction::Select(i) => state
            .slash_results()
            .get(i)
            .map(|command| EditIntent::ApplySlashCommand(command.id.to_string())),
        MenuAction::Close => Some(EditIntent::CloseSlashMenu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, ContentBlock};

    fn state_with(texts: &[&str], selected: usize) -> EditorState {
        let mut state = EditorState::from_blocks(
            texts
                .iter()
                .map(|t| ContentBlock::new(BlockKind::Paragraph, *t))
                .collect(),
        );
        state.apply(EditIntent::Select(selected));
        state
    }

    #[test]
    fn test_enter_inserts_unless_modified() {
        let state = state_with(&["hello"], 0);
        assert_eq!(
            translate_key(KeyInput::new(Key::Enter), Caret::at(5), &state),
            Some(EditIntent::InsertAfter(0))
        );
        assert_eq!(
            translate_key(
                KeyInput::with_modifiers(Key::Enter, Modifiers::shift()),
                Caret::at(5),
                &state
            ),
            None
        );
    }

    #[test]
    fn test_backspace_deletes_only_empty_non_last_block() {
        let state = state_with(&["a", ""], 1);
        assert_eq!(
            translate_key(KeyInput::new(Key::Backspace), Caret::at(0), &state),
            Some(EditIntent::Delete(1))
        );

        let state = state_with(&["a", "text"], 1);
        assert_eq!(
            translate_key(KeyInput::new(Key::Backspace), Caret::at(0), &state),
            None
        );

        let state = state_with(&[""], 0);
        assert_eq!(
            translate_key(KeyInput::new(Key::Backspace), Caret::at(0), &state),
            None
        );
    }

    #[test]
    fn test_arrows_cross_blocks_only_at_text_edges() {
        let state = state_with(&["first", "héllo", "third"], 1);

        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowUp), Caret::at(0), &state),
            Some(EditIntent::SelectPrevious)
        );
        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowUp), Caret::at(2), &state),
            None
        );
        // Offsets count characters, not bytes
        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowDown), Caret::at(5), &state),
            Some(EditIntent::SelectNext)
        );
        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowDown), Caret::at(4), &state),
            None
        );
    }

    #[test]
    fn test_no_selection_means_no_intent() {
        let state = EditorState::from_blocks(Vec::new());
        assert_eq!(
            translate_key(KeyInput::new(Key::Enter), Caret::at(0), &state),
            None
        );
    }

    #[test]
    fn test_open_menu_captures_navigation_keys() {
        let mut state = state_with(&["a"], 0);
        state.apply(EditIntent::set_content(0, "/head"));

        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowDown), Caret::at(5), &state),
            Some(EditIntent::HighlightNext)
        );
        assert_eq!(
            translate_key(KeyInput::new(Key::ArrowUp), Caret::at(0), &state),
            Some(EditIntent::HighlightPrevious)
        );
        assert_eq!(
            translate_key(KeyInput::new(Key::Escape), Caret::at(5), &state),
            Some(EditIntent::CloseSlashMenu)
        );
        assert_eq!(
            translate_key(KeyInput::new(Key::Char('x')), Caret::at(5), &state),
            None
        );
    }

    #[test]
    fn test_enter_on_menu_applies_highlighted_command() {
        let mut state = state_with(&["a"], 0);
        state.apply(EditIntent::set_content(0, "/head"));
        state.apply(EditIntent::HighlightNext);

        let intent = translate_key(KeyInput::new(Key::Enter), Caret::at(5), &state).unwrap();
        assert_eq!(intent, EditIntent::ApplySlashCommand("heading2".to_string()));

        assert!(state.apply(intent));
        assert_eq!(state.blocks[0].kind, BlockKind::Heading { level: 2 });
    }

    #[test]
    fn test_enter_on_empty_results_closes_menu() {
        let mut state = state_with(&["a"], 0);
        state.apply(EditIntent::set_content(0, "/qqqq"));
        assert!(state.slash_results().is_empty());

        assert_eq!(
            translate_key(KeyInput::new(Key::Enter), Caret::at(5), &state),
            Some(EditIntent::CloseSlashMenu)
        );
    }
}
