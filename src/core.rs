//! Core runtime logic for fiander.
//!
//! This module contains the non-UI “engine” pieces used by the application:
//! - [fm] and [listing]: directory reads and sorted, immutable listings.
//! - [viewport]: cursor and scroll arithmetic, independent of rendering.
//! - [formatter]: sorting/filtering rules and display helpers.
//! - [highlight] and [worker]: preview production on a background thread.
//! - [fileops], [clipboard] and [export]: what register commits and catlsr exports act on.
//! - [terminal]: terminal setup/teardown and the main crossterm/ratatui event loop.
//!
//! Errors for all of the above live in [error].

pub mod clipboard;
pub mod error;
pub mod export;
pub mod fileops;
pub mod fm;
pub mod formatter;
pub mod highlight;
pub mod listing;
pub mod terminal;
pub mod viewport;
pub mod worker;

pub use clipboard::{ClipboardWriter, MemoryClipboard, RegisterOp, SystemClipboard};
pub use error::{
    ClipboardError, CommitError, ConfigError, ExportError, ListingError, PreviewError,
};
pub use export::{ExportJob, ExportOutput, ExportProgress, ExportRules};
pub use fileops::{CommitFailure, CommitReport, FileOps, OpOutcome, StdFileOps};
pub use fm::{EntryKind, FileEntry, browse_dir};
pub use formatter::{
    Formatter, format_file_size, format_file_time, normalize_relative_path,
    sanitize_to_exact_width,
};
pub use highlight::{BatHighlighter, Highlighter, PlainHighlighter, read_line_range};
pub use listing::{DirectoryListing, SortKey, SortOrder, SortSpec};
pub use viewport::{Cursor, Viewport, clamp_top, half_page};
