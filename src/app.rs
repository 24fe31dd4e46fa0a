//! Application layer of fiander.
//!
//! [state::AppState] is the navigation session. Around it:
//! - [mode] and [keymap]: the modal key state machine and the configured bindings.
//! - [nav], [selection] and [register]: listing and cursor, the visual range, the clipboard register.
//! - [preview]: the debounced, generation-checked preview pane state.
//! - [actions]: the `:` prompt.
//! - [handlers] and [view]: event dispatch and the draw model handed to the ui.

pub mod actions;
pub mod handlers;
pub mod keymap;
pub mod mode;
pub mod nav;
pub mod preview;
pub mod register;
pub mod selection;
pub mod state;
pub mod view;

pub use keymap::{Action, Keymap};
pub use mode::{Focus, KeyOutcome, Mode, ModeController};
pub use nav::NavState;
pub use preview::{LineMark, PreviewData, PreviewState};
pub use register::ClipboardRegister;
pub use selection::SelectionSet;
pub use state::{
    AppState, KeypressResult, LayoutMetrics, Services, StatusLevel, StatusMessage,
};
pub use view::{PreviewView, PromptView, RenderRequest, RowView};
