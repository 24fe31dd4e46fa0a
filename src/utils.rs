//! Miscellaneous utility functions for fiander.
//!
//! [helpers] holds path and colour helpers used across the crate, [cli] the argument parser
//! and [logging] the log file setup.

pub mod cli;
pub mod helpers;
pub mod logging;

pub use helpers::{
    copy_recursive, expand_home_path, get_home, get_unused_path, open_in_editor, parse_color,
    remove_path, resolve_initial_dir, shorten_home_path,
};
