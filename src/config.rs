//! Configuration for fiander.
//!
//! [load] reads `fiander.toml` into a [Config]; the other submodules hold one table each.

pub mod display;
pub mod export;
pub mod general;
pub mod input;
pub mod load;
pub mod theme;

pub use display::{BatOptions, BorderShape, Display, PreviewMethod};
pub use export::ExportConfig;
pub use general::{General, InternalGeneral};
pub use input::{Editor, Input, Keys};
pub use load::{Config, RawConfig};
pub use theme::{ColorPair, Theme};
