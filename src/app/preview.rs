//! State and helpers for the preview pane in fiander.
//!
//! Tracks the loaded preview, the debounce before a new request goes out, the id of the
//! request the pane is waiting for and the scroll offset. Responses carrying any other id
//! are dropped, so a late result for an old entry never replaces the preview of a newer one.
//!
//! While the pane has focus, a [LineMark] selects a range of text lines for copying. Any
//! change of the shown text drops it.

use crate::core::worker::{PreviewContent, WorkerResponse};
use crate::core::FileEntry;

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Delay between the last cursor move and the preview request.
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(75);

/// Preview content for the preview pane
pub enum PreviewData {
    Empty,
    /// A request is out and nothing has arrived yet.
    Pending,
    File(Vec<String>),
    Directory { entries: Vec<FileEntry>, total: usize },
    /// Shown instead of content, e.g. for binary files.
    Notice(String),
}

impl PreviewData {
    /// Scrollable rows of the data.
    pub fn len(&self) -> usize {
        match self {
            PreviewData::File(lines) => lines.len(),
            PreviewData::Directory { entries, .. } => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Marked line range of the preview text. `anchor` stays put, `cursor` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMark {
    pub anchor: usize,
    pub cursor: usize,
}

impl LineMark {
    pub fn range(&self) -> RangeInclusive<usize> {
        self.anchor.min(self.cursor)..=self.anchor.max(self.cursor)
    }

    pub fn line_count(&self) -> usize {
        self.anchor.abs_diff(self.cursor) + 1
    }
}

pub struct PreviewState {
    data: PreviewData,
    current_path: Option<PathBuf>,
    request_id: u64,
    pending: bool,
    last_input_time: Instant,
    scroll: usize,
    output: Option<Vec<String>>,
    showing_output: bool,
    mark: Option<LineMark>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            data: PreviewData::Empty,
            current_path: None,
            request_id: 0,
            pending: false,
            last_input_time: Instant::now(),
            scroll: 0,
            output: None,
            showing_output: false,
            mark: None,
        }
    }
}

impl PreviewState {
    // Getters/ Accessors

    #[inline]
    pub fn data(&self) -> &PreviewData {
        &self.data
    }

    #[inline]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    #[inline]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[inline]
    pub fn showing_output(&self) -> bool {
        self.showing_output && self.output.is_some()
    }

    pub fn output(&self) -> Option<&[String]> {
        self.output.as_deref()
    }

    /// Rows the scroll offset moves over: the last output when it is shown, else the data.
    pub fn scroll_len(&self) -> usize {
        match (&self.output, self.showing_output) {
            (Some(lines), true) => lines.len(),
            _ => self.data.len(),
        }
    }

    pub fn line_mark(&self) -> Option<LineMark> {
        self.mark
    }

    /// Number of text lines shown, if the pane shows text at all.
    fn text_len(&self) -> Option<usize> {
        match (&self.output, self.showing_output, &self.data) {
            (Some(lines), true, _) => Some(lines.len()),
            (_, _, PreviewData::File(lines)) => Some(lines.len()),
            _ => None,
        }
    }

    // Requests

    /// Marks a preview as wanted; it goes out once the debounce elapsed.
    pub fn mark_pending(&mut self, now: Instant) {
        self.pending = true;
        self.last_input_time = now;
    }

    pub fn should_trigger(&self, now: Instant, debounce: Duration) -> bool {
        self.pending && now.saturating_duration_since(self.last_input_time) >= debounce
    }

    /// Tracks a request that went out under `request_id`.
    pub fn prepare_new_request(&mut self, path: PathBuf, request_id: u64) {
        self.request_id = request_id;
        self.current_path = Some(path);
        self.pending = false;
        self.scroll = 0;
        self.mark = None;
        self.data = PreviewData::Pending;
    }

    /// Applies a worker response. Returns false when it was stale and dropped.
    pub fn apply(&mut self, response: WorkerResponse) -> bool {
        if response.request_id() != self.request_id {
            tracing::trace!(
                got = response.request_id(),
                want = self.request_id,
                "dropping stale preview"
            );
            return false;
        }
        self.data = match response {
            WorkerResponse::PreviewLoaded { content, .. } => match content {
                PreviewContent::Lines(lines) => PreviewData::File(lines),
                PreviewContent::Directory { entries, total } => {
                    PreviewData::Directory { entries, total }
                }
            },
            WorkerResponse::PreviewFailed { error, .. } => PreviewData::Notice(error.to_string()),
        };
        if !self.showing_output() {
            self.mark = None;
        }
        true
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.data = PreviewData::Notice(text.into());
        self.pending = false;
        self.scroll = 0;
        self.mark = None;
    }

    /// Clears the preview state
    pub fn clear(&mut self) {
        self.data = PreviewData::Empty;
        self.current_path = None;
        self.pending = false;
        self.scroll = 0;
        self.mark = None;
    }

    // Scrolling

    /// Moves the offset, clamped to the content. `isize::MIN` and `isize::MAX` reach the ends.
    pub fn scroll_by(&mut self, delta: isize, rows: usize) {
        let max = self.scroll_len().saturating_sub(rows);
        self.scroll = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize).min(max)
        };
    }

    // Line marking

    /// Starts a mark on the top visible line. Returns false when no text is shown.
    pub fn start_line_mark(&mut self) -> bool {
        match self.text_len() {
            Some(len) if len > 0 => {
                let line = self.scroll.min(len - 1);
                self.mark = Some(LineMark {
                    anchor: line,
                    cursor: line,
                });
                true
            }
            _ => false,
        }
    }

    /// Moves the mark cursor, scrolling so it stays inside `rows`.
    pub fn move_line_mark(&mut self, delta: isize, rows: usize) {
        let Some(mark) = self.mark else {
            return;
        };
        let line = if delta < 0 {
            mark.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            mark.cursor.saturating_add(delta as usize)
        };
        self.set_line_mark_cursor(line, rows);
    }

    /// Puts the mark cursor on `line`, clamped to the text.
    pub fn set_line_mark_cursor(&mut self, line: usize, rows: usize) {
        let text_len = self.text_len();
        let (Some(mark), Some(len)) = (self.mark.as_mut(), text_len) else {
            return;
        };
        mark.cursor = line.min(len.saturating_sub(1));
        let cursor = mark.cursor;
        let rows = rows.max(1);
        if cursor < self.scroll {
            self.scroll = cursor;
        } else if cursor >= self.scroll + rows {
            self.scroll = cursor + 1 - rows;
        }
    }

    pub fn take_line_mark(&mut self) -> Option<LineMark> {
        self.mark.take()
    }

    /// Drops the mark. Returns true if there was one.
    pub fn cancel_line_mark(&mut self) -> bool {
        self.mark.take().is_some()
    }

    /// Lines of the shown output in `range`, joined by newlines.
    /// None when the pane shows the file preview instead.
    pub fn output_lines(&self, range: RangeInclusive<usize>) -> Option<String> {
        if !self.showing_output() {
            return None;
        }
        let lines = self.output.as_deref()?;
        let end = (*range.end() + 1).min(lines.len());
        let start = (*range.start()).min(end);
        Some(lines[start..end].join("\n"))
    }

    // Last output

    /// Keeps the text of the last export for the `o` toggle.
    pub fn set_output(&mut self, blob: &str) {
        self.output = Some(blob.lines().map(str::to_owned).collect());
        if self.showing_output {
            self.mark = None;
        }
    }

    /// Toggles showing the last output. Returns false when there is none.
    pub fn toggle_output(&mut self) -> bool {
        if self.output.is_none() {
            return false;
        }
        self.showing_output = !self.showing_output;
        self.scroll = 0;
        self.mark = None;
        true
    }

    pub fn hide_output(&mut self) {
        if self.showing_output {
            self.showing_output = false;
            self.scroll = 0;
            self.mark = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PreviewError;

    fn loaded(lines: &[&str], request_id: u64) -> WorkerResponse {
        WorkerResponse::PreviewLoaded {
            path: PathBuf::from("/x"),
            content: PreviewContent::Lines(lines.iter().map(|s| s.to_string()).collect()),
            request_id,
        }
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut preview = PreviewState::default();
        preview.prepare_new_request(PathBuf::from("/e"), 1);
        preview.prepare_new_request(PathBuf::from("/f"), 2);

        assert!(!preview.apply(loaded(&["from e"], 1)));
        assert!(matches!(preview.data(), PreviewData::Pending));

        assert!(preview.apply(loaded(&["from f"], 2)));
        match preview.data() {
            PreviewData::File(lines) => assert_eq!(lines, &["from f".to_string()]),
            _ => panic!("expected file lines"),
        }
    }

    #[test]
    fn debounce_waits_for_quiet_input() {
        let mut preview = PreviewState::default();
        let start = Instant::now();
        preview.mark_pending(start);
        assert!(!preview.should_trigger(start + Duration::from_millis(10), PREVIEW_DEBOUNCE));
        assert!(preview.should_trigger(start + Duration::from_millis(80), PREVIEW_DEBOUNCE));
        assert!(preview.should_trigger(start, Duration::ZERO));
    }

    #[test]
    fn failure_becomes_notice() {
        let mut preview = PreviewState::default();
        preview.prepare_new_request(PathBuf::from("/bin"), 7);
        preview.apply(WorkerResponse::PreviewFailed {
            path: PathBuf::from("/bin"),
            error: PreviewError::Binary,
            request_id: 7,
        });
        assert!(matches!(preview.data(), PreviewData::Notice(n) if n.contains("Binary")));
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut preview = PreviewState::default();
        preview.prepare_new_request(PathBuf::from("/x"), 1);
        let lines: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        preview.apply(loaded(&refs, 1));

        preview.scroll_by(100, 10);
        assert_eq!(preview.scroll(), 40);
        preview.scroll_by(-15, 10);
        assert_eq!(preview.scroll(), 25);
        preview.scroll_by(-100, 10);
        assert_eq!(preview.scroll(), 0);
    }

    #[test]
    fn output_toggle_needs_output() {
        let mut preview = PreviewState::default();
        assert!(!preview.toggle_output());
        preview.set_output("a\nb\nc");
        assert!(preview.toggle_output());
        assert!(preview.showing_output());
        assert_eq!(preview.scroll_len(), 3);
        preview.hide_output();
        assert!(!preview.showing_output());
    }

    fn file_of(len: usize) -> PreviewState {
        let mut preview = PreviewState::default();
        preview.prepare_new_request(PathBuf::from("/x"), 1);
        let lines: Vec<String> = (0..len).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        preview.apply(loaded(&refs, 1));
        preview
    }

    #[test]
    fn line_mark_follows_its_cursor_and_scrolls() {
        let mut preview = file_of(30);
        preview.scroll_by(5, 10);
        assert!(preview.start_line_mark());
        assert_eq!(preview.line_mark().map(|m| m.range()), Some(5..=5));

        preview.move_line_mark(12, 10);
        let mark = preview.line_mark().unwrap_or(LineMark { anchor: 0, cursor: 0 });
        assert_eq!(mark.range(), 5..=17);
        assert_eq!(mark.line_count(), 13);
        assert_eq!(preview.scroll(), 8);

        preview.move_line_mark(-20, 10);
        assert_eq!(preview.line_mark().map(|m| m.range()), Some(0..=5));
        assert_eq!(preview.scroll(), 0);

        preview.move_line_mark(100, 10);
        assert_eq!(preview.line_mark().map(|m| m.range()), Some(5..=29));
        assert_eq!(preview.scroll(), 20);
    }

    #[test]
    fn line_mark_needs_text() {
        let mut preview = PreviewState::default();
        assert!(!preview.start_line_mark());
        preview.set_notice("Binary file - no preview");
        assert!(!preview.start_line_mark());

        preview.set_output("a\nb\nc");
        preview.toggle_output();
        assert!(preview.start_line_mark());
        preview.move_line_mark(1, 10);
        assert_eq!(preview.output_lines(0..=1).as_deref(), Some("a\nb"));
    }

    #[test]
    fn new_content_drops_the_mark() {
        let mut preview = file_of(5);
        assert!(preview.start_line_mark());
        preview.prepare_new_request(PathBuf::from("/y"), 2);
        assert!(preview.line_mark().is_none());

        let mut preview = file_of(5);
        preview.set_output("out");
        assert!(preview.start_line_mark());
        preview.toggle_output();
        assert!(preview.line_mark().is_none());
        assert!(preview.output_lines(0..=0).is_some());
        assert!(!preview.cancel_line_mark());
    }
}
