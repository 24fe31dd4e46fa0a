//! Navigation state and file list logic for fiander.
//!
//! Manages the current directory listing, the cursor and its window, saved cursor positions
//! per directory and the bounded back stack.

use crate::core::{Cursor, DirectoryListing, FileEntry, ListingError, SortSpec, Viewport};

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Holds the navigation state of the list pane.
#[derive(Debug)]
pub struct NavState {
    listing: DirectoryListing,
    cursor: Cursor,
    view: Viewport,
    positions: HashMap<PathBuf, usize>,
    /// Keys of `positions`, least recently saved first.
    position_order: VecDeque<PathBuf>,
    history: VecDeque<PathBuf>,
    history_limit: usize,
    sort: SortSpec,
    show_hidden: bool,
}

impl NavState {
    /// Creates the state with an unread listing of `path`. Call [NavState::reload] to read it.
    pub fn new(path: PathBuf, sort: SortSpec, show_hidden: bool, history_limit: usize) -> Self {
        Self {
            listing: DirectoryListing::empty(path, sort),
            cursor: Cursor::default(),
            view: Viewport::default(),
            positions: HashMap::new(),
            position_order: VecDeque::new(),
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            sort,
            show_hidden,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn current_dir(&self) -> &Path {
        self.listing.path()
    }

    #[inline]
    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        self.listing.entries()
    }

    #[inline]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[inline]
    pub fn selected_idx(&self) -> usize {
        self.cursor.index()
    }

    #[inline]
    pub fn view(&self) -> Viewport {
        self.view
    }

    #[inline]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn history(&self) -> impl Iterator<Item = &Path> {
        self.history.iter().map(PathBuf::as_path)
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.listing.get(self.cursor.index())
    }

    // Directory changes

    /// Opens `path`, remembering the current directory on the back stack.
    ///
    /// On failure the listing is empty and the error is returned for the status line.
    pub fn enter(&mut self, path: &Path) -> Result<(), ListingError> {
        self.push_history();
        self.open(path, None)
    }

    /// Goes to the parent directory with the cursor on the directory just left.
    /// Returns `Ok(false)` at the filesystem root.
    pub fn leave(&mut self) -> Result<bool, ListingError> {
        let Some(parent) = self.current_dir().parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        let child = self.current_dir().to_path_buf();
        self.push_history();
        self.open(&parent, Some(&child))?;
        Ok(true)
    }

    /// Pops the back stack. Returns `Ok(false)` when there is nowhere to go back to.
    pub fn back(&mut self) -> Result<bool, ListingError> {
        let Some(prev) = self.history.pop_back() else {
            return Ok(false);
        };
        self.open(&prev, None)?;
        Ok(true)
    }

    /// Re-reads the current directory keeping the cursor on the same entry.
    pub fn reload(&mut self) -> Result<(), ListingError> {
        let focus = self.selected_entry().map(|e| e.path().to_path_buf());
        let path = self.current_dir().to_path_buf();
        let listing = match DirectoryListing::read(&path, self.sort, self.show_hidden) {
            Ok(listing) => listing,
            Err(e) => {
                self.replace_listing(DirectoryListing::empty(path, self.sort), None);
                return Err(e);
            }
        };
        self.replace_listing(listing, focus.as_deref());
        Ok(())
    }

    /// Applies a new sort; the cursor follows its entry, not its row.
    pub fn resort(&mut self, sort: SortSpec) {
        self.sort = sort;
        let focus = self.selected_entry().map(|e| e.path().to_path_buf());
        let listing = self.listing.resorted(sort);
        self.replace_listing(listing, focus.as_deref());
    }

    pub fn set_show_hidden(&mut self, show: bool) -> Result<(), ListingError> {
        self.show_hidden = show;
        self.reload()
    }

    fn open(&mut self, path: &Path, focus: Option<&Path>) -> Result<(), ListingError> {
        self.save_position();
        let result = DirectoryListing::read(path, self.sort, self.show_hidden);
        let (listing, error) = match result {
            Ok(listing) => (listing, None),
            Err(e) => (DirectoryListing::empty(path.to_path_buf(), self.sort), Some(e)),
        };

        let index = focus
            .and_then(|f| listing.position_of(f))
            .or_else(|| self.positions.get(listing.path()).copied())
            .unwrap_or(0);

        self.listing = listing;
        self.cursor = Cursor::new(index, 0);
        self.cursor.clamp(self.listing.len(), self.view);
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn replace_listing(&mut self, listing: DirectoryListing, focus: Option<&Path>) {
        let index = focus
            .and_then(|f| listing.position_of(f))
            .unwrap_or(self.cursor.index());
        self.listing = listing;
        self.cursor = Cursor::new(index, self.cursor.top());
        self.cursor.clamp(self.listing.len(), self.view);
    }

    /// Remembers the cursor of the current directory. Holds at most `history_limit`
    /// directories, dropping the least recently saved.
    fn save_position(&mut self) {
        if self.listing.is_empty() {
            return;
        }
        let dir = self.current_dir().to_path_buf();
        if self.positions.insert(dir.clone(), self.cursor.index()).is_some() {
            self.position_order.retain(|d| d != &dir);
        }
        self.position_order.push_back(dir);
        while self.position_order.len() > self.history_limit {
            if let Some(old) = self.position_order.pop_front() {
                self.positions.remove(&old);
            }
        }
    }

    fn push_history(&mut self) {
        let current = self.current_dir().to_path_buf();
        if self.history.back() == Some(&current) {
            return;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(current);
    }

    // Cursor movement

    /// Updates the window size. A zero row window keeps the previous scroll position.
    pub fn set_viewport(&mut self, view: Viewport) {
        self.view = view;
        self.cursor.clamp(self.listing.len(), view);
    }

    pub fn move_by(&mut self, delta: isize) {
        self.cursor.move_by(delta, self.listing.len(), self.view);
    }

    pub fn move_to(&mut self, index: usize) {
        self.cursor.move_to(index, self.listing.len(), self.view);
    }

    pub fn go_to_top(&mut self) {
        self.move_to(0);
    }

    pub fn go_to_bottom(&mut self) {
        self.move_to(self.listing.len().saturating_sub(1));
    }

    pub fn half_page_down(&mut self) {
        self.cursor.half_page_down(self.listing.len(), self.view);
    }

    pub fn half_page_up(&mut self) {
        self.cursor.half_page_up(self.listing.len(), self.view);
    }

    pub fn page_down(&mut self) {
        self.cursor.page_down(self.listing.len(), self.view);
    }

    pub fn page_up(&mut self) {
        self.cursor.page_up(self.listing.len(), self.view);
    }

    /// Mouse wheel: moves the window, the cursor only as far as the margin requires.
    pub fn scroll_by(&mut self, delta: isize) {
        self.cursor.scroll_by(delta, self.listing.len(), self.view);
    }

    /// Listing index under a row of the list area.
    pub fn index_at_row(&self, row: usize) -> Option<usize> {
        self.cursor.row_to_index(row, self.listing.len())
    }
}
