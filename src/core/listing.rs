//! Immutable, sorted snapshots of one directory.
//!
//! A [DirectoryListing] is never reordered in place: [DirectoryListing::resorted] builds a new
//! listing that shares the same entries.

use crate::core::error::ListingError;
use crate::core::fm::{FileEntry, browse_dir};
use crate::core::formatter::Formatter;

use serde::Deserialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    #[serde(alias = "mtime")]
    Modified,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Size,
            SortKey::Size => SortKey::Modified,
            SortKey::Modified => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::Modified => "mtime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// How a listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
    pub dirs_first: bool,
    pub case_insensitive: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Name,
            order: SortOrder::Ascending,
            dirs_first: true,
            case_insensitive: true,
        }
    }
}

impl SortSpec {
    pub fn with_key(self, key: SortKey) -> Self {
        Self { key, ..self }
    }

    pub fn reversed(self) -> Self {
        let order = match self.order {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        };
        Self { order, ..self }
    }

    /// Total order over entries. Ties on the sort key fall back to the name so the order is
    /// deterministic.
    pub fn compare(&self, a: &FileEntry, b: &FileEntry) -> Ordering {
        if self.dirs_first {
            match (a.is_dir(), b.is_dir()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        let by_name = || {
            if self.case_insensitive {
                a.name_str()
                    .to_lowercase()
                    .cmp(&b.name_str().to_lowercase())
                    .then_with(|| a.name().cmp(b.name()))
            } else {
                a.name().cmp(b.name())
            }
        };

        let ord = match self.key {
            SortKey::Name => by_name(),
            SortKey::Size => a.size().cmp(&b.size()).then_with(by_name),
            SortKey::Modified => a.modified().cmp(&b.modified()).then_with(by_name),
        };

        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }

    pub fn label(&self) -> String {
        let arrow = match self.order {
            SortOrder::Ascending => "",
            SortOrder::Descending => " (rev)",
        };
        format!("{}{}", self.key.label(), arrow)
    }
}

/// One directory's entries, sorted and indexed.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    path: PathBuf,
    entries: Arc<[FileEntry]>,
    sort: SortSpec,
}

impl DirectoryListing {
    pub fn empty(path: PathBuf, sort: SortSpec) -> Self {
        Self {
            path,
            entries: Arc::from(Vec::new()),
            sort,
        }
    }

    /// Builds a listing from already-read entries, sorting them with `sort`.
    pub fn from_entries(path: PathBuf, mut entries: Vec<FileEntry>, sort: SortSpec) -> Self {
        entries.sort_by(|a, b| sort.compare(a, b));
        Self {
            path,
            entries: Arc::from(entries),
            sort,
        }
    }

    /// Lists `path` from disk.
    pub fn read(path: &Path, sort: SortSpec, show_hidden: bool) -> Result<Self, ListingError> {
        let mut entries = browse_dir(path)?;
        Formatter::new(sort, show_hidden).filter_entries(&mut entries);
        Ok(Self {
            path: path.to_path_buf(),
            entries: Arc::from(entries),
            sort,
        })
    }

    /// Returns a new listing with the same entries in `sort` order.
    pub fn resorted(&self, sort: SortSpec) -> Self {
        Self::from_entries(self.path.clone(), self.entries.to_vec(), sort)
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    #[inline]
    pub fn shared_entries(&self) -> Arc<[FileEntry]> {
        Arc::clone(&self.entries)
    }

    #[inline]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&FileEntry> {
        self.entries.get(idx)
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path() == path)
    }
}
