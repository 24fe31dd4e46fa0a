//! Scroll arithmetic for a list shown through a fixed-height window.
//!
//! Everything here is pure: no rendering, no I/O. [clamp_top] restores the cursor/window
//! invariant and every cursor motion goes through it.

use std::ops::Range;

/// Default step for one mouse wheel notch.
pub const WHEEL_STEP: usize = 3;

/// Window geometry the cursor is kept inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub rows: usize,
    pub scrolloff: usize,
}

impl Viewport {
    pub fn new(rows: usize, scrolloff: usize) -> Self {
        Self { rows, scrolloff }
    }

    #[inline]
    pub fn effective_scrolloff(&self) -> usize {
        effective_scrolloff(self.scrolloff, self.rows)
    }

    #[inline]
    pub fn half_page(&self) -> usize {
        half_page(self.rows)
    }
}

/// Scrolloff can never exceed half the window, or the cursor would have nowhere to sit.
#[inline]
pub fn effective_scrolloff(scrolloff: usize, rows: usize) -> usize {
    scrolloff.min(rows.saturating_sub(1) / 2)
}

/// Half a window, rounded down, at least one row.
#[inline]
pub fn half_page(rows: usize) -> usize {
    (rows / 2).max(1)
}

/// Computes the first visible index so that `cursor` is on screen and keeps `scrolloff` rows
/// of margin where the listing allows it.
///
/// With `rows == 0` nothing can be shown and `prev_top` is returned unchanged.
pub fn clamp_top(cursor: usize, len: usize, rows: usize, scrolloff: usize, prev_top: usize) -> usize {
    if rows == 0 {
        return prev_top;
    }
    if len <= rows {
        return 0;
    }

    let so = effective_scrolloff(scrolloff, rows);
    let max_top = len - rows;
    let cursor = cursor.min(len - 1);
    let mut top = prev_top.min(max_top);

    if cursor < top + so {
        top = cursor.saturating_sub(so);
    }
    if cursor + so >= top + rows {
        top = cursor + so + 1 - rows;
    }

    top.min(max_top)
}

/// Cursor position together with the first visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    index: usize,
    top: usize,
}

impl Cursor {
    pub fn new(index: usize, top: usize) -> Self {
        Self { index, top }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    /// Clamps the index into the listing and recomputes the window.
    pub fn clamp(&mut self, len: usize, view: Viewport) {
        self.index = self.index.min(len.saturating_sub(1));
        self.top = clamp_top(self.index, len, view.rows, view.scrolloff, self.top);
    }

    pub fn move_to(&mut self, index: usize, len: usize, view: Viewport) {
        self.index = index;
        self.clamp(len, view);
    }

    /// Moves by `delta` rows. Stops at the first and last entry.
    pub fn move_by(&mut self, delta: isize, len: usize, view: Viewport) {
        let target = if delta < 0 {
            self.index.saturating_sub(delta.unsigned_abs())
        } else {
            self.index.saturating_add(delta as usize)
        };
        self.move_to(target, len, view);
    }

    pub fn half_page_down(&mut self, len: usize, view: Viewport) {
        self.move_by(view.half_page() as isize, len, view);
    }

    pub fn half_page_up(&mut self, len: usize, view: Viewport) {
        self.move_by(-(view.half_page() as isize), len, view);
    }

    pub fn page_down(&mut self, len: usize, view: Viewport) {
        self.move_by(view.rows.max(1) as isize, len, view);
    }

    pub fn page_up(&mut self, len: usize, view: Viewport) {
        self.move_by(-(view.rows.max(1) as isize), len, view);
    }

    /// Scrolls the window by `delta` rows, dragging the cursor along only as far as the
    /// margin requires.
    pub fn scroll_by(&mut self, delta: isize, len: usize, view: Viewport) {
        if view.rows == 0 || len <= view.rows {
            return;
        }
        let max_top = len - view.rows;
        let top = if delta < 0 {
            self.top.saturating_sub(delta.unsigned_abs())
        } else {
            self.top.saturating_add(delta as usize).min(max_top)
        };
        let so = view.effective_scrolloff();
        let low = if top == 0 { 0 } else { top + so };
        let high = if top == max_top {
            len - 1
        } else {
            top + view.rows - 1 - so
        };
        self.top = top;
        self.index = self.index.clamp(low, high);
    }

    /// Indices currently on screen.
    pub fn visible_range(&self, len: usize, rows: usize) -> Range<usize> {
        let start = self.top.min(len);
        start..(start + rows).min(len)
    }

    /// Maps a row inside the list area to a listing index.
    pub fn row_to_index(&self, row: usize, len: usize) -> Option<usize> {
        let idx = self.top + row;
        (idx < len).then_some(idx)
    }
}
