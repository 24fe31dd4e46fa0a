//! Terminal UI of fiander.
//!
//! [render::render] is called by the terminal loop once per frame. It lays out the panes,
//! reports their inner areas back to the session and draws the [crate::app::RenderRequest].

pub mod panes;
pub mod render;
pub mod widgets;

pub use render::render;
