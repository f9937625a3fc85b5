//! Block Editor
//!
//! In-memory editing engine for one page's content:
//!
//! - `state` - `EditorState` and its synchronous reducers
//! - `intent` - `EditIntent` and keyboard translation
//! - `slash` - Slash command catalog, filtering and menu navigation
//! - `session` - `EditorSession`, the save/publish boundary to `PageService`
//!
//! Nothing here touches storage except [`EditorSession`], and only on an
//! explicit save or publish.

pub mod intent;
pub mod session;
pub mod slash;
pub mod state;

pub use intent::{translate_key, Caret, EditIntent, Key, KeyInput, Modifiers};
pub use session::{EditorSession, SaveError, SaveRequest};
pub use slash::{
    group_by_category, MenuAction, MenuKey, SlashCategory, SlashCommand, SlashCommandRegistry,
    SlashMenuNavigator,
};
pub use state::{EditorState, MoveDirection, ScreenPosition, SlashMenuState};
