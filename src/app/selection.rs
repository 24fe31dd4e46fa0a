//! Visual mode selection.
//!
//! A [SelectionSet] is always one contiguous run of a single listing. Moving the cursor in
//! Visual mode replaces the whole range; nothing accumulates.

use crate::core::DirectoryListing;

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionSet {
    dir: Option<PathBuf>,
    range: Option<RangeInclusive<usize>>,
    paths: Vec<PathBuf>,
    lookup: HashSet<PathBuf>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `[min(anchor, cursor), max(anchor, cursor)]` of `listing`, replacing the
    /// previous selection. Indices past the end are clamped.
    pub fn select_range(&mut self, listing: &DirectoryListing, anchor: usize, cursor: usize) {
        self.clear();
        if listing.is_empty() {
            return;
        }
        let last = listing.len() - 1;
        let (lo, hi) = (anchor.min(cursor).min(last), anchor.max(cursor).min(last));

        self.paths = listing.entries()[lo..=hi]
            .iter()
            .map(|e| e.path().to_path_buf())
            .collect();
        self.lookup = self.paths.iter().cloned().collect();
        self.range = Some(lo..=hi);
        self.dir = Some(listing.path().to_path_buf());
    }

    pub fn clear(&mut self) {
        self.dir = None;
        self.range = None;
        self.paths.clear();
        self.lookup.clear();
    }

    /// Drops the selection if it belongs to a directory other than `dir`.
    pub fn retain_dir(&mut self, dir: &Path) {
        if self.dir.as_deref().is_some_and(|d| d != dir) {
            self.clear();
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Selected paths in listing order.
    #[inline]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lookup.contains(path)
    }

    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        self.range.clone()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}
