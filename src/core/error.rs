//! Error types for fiander.
//!
//! Every failure the browser can recover from has its own enum here. None of them are fatal:
//! the session turns them into a status line message and keeps running.

use crate::core::fileops::CommitReport;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Listing a directory failed. The session shows an empty listing instead.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("No such directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ListingError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::NotADirectory => Self::NotADirectory(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// A preview could not be produced. The preview pane shows a notice instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreviewError {
    #[error("Binary file - no preview")]
    Binary,

    #[error("File too large for preview ({0} bytes)")]
    TooLarge(u64),

    #[error("Not a regular file")]
    NotARegularFile,

    #[error("Unreadable: {0}")]
    Unreadable(String),

    #[error("Highlighter failed: {0}")]
    Highlighter(String),
}

impl From<io::Error> for PreviewError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::Unreadable("permission denied".into()),
            io::ErrorKind::NotFound => Self::Unreadable("file not found".into()),
            _ => Self::Unreadable(err.to_string()),
        }
    }
}

/// Applying a register failed, entirely or for some of its entries.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Register is empty")]
    EmptyRegister,

    #[error("An export register holds text, not files")]
    NotCommittable,

    #[error("{} of {} entries failed", .0.failed.len(), .0.total())]
    Partial(CommitReport),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Export failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),
}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        match err {
            arboard::Error::ClipboardNotSupported => Self::Unavailable(err.to_string()),
            other => Self::Write(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Read(#[from] io::Error),

    #[error("Error parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}
