//! The draw model of a session.
//!
//! [AppState::render_request] flattens the session into a [RenderRequest]: only the rows
//! that fit the list window, the preview slice and the status line. The `ui` module draws it
//! without reaching back into the session.

use crate::app::actions::PromptKind;
use crate::app::mode::Focus;
use crate::app::preview::PreviewData;
use crate::app::state::{AppState, StatusMessage};
use crate::core::{FileEntry, SortKey, format_file_size, format_file_time};
use crate::utils::shorten_home_path;

use std::borrow::Cow;
use std::ops::RangeInclusive;

/// One visible row of the list pane.
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    pub entry: &'a FileEntry,
    pub name: Cow<'a, str>,
    /// Size, or the modification time when sorting by it.
    pub info: String,
    pub is_cursor: bool,
    /// Inside the visual range.
    pub selected: bool,
    /// Part of the live register.
    pub staged: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum PreviewView<'a> {
    Empty,
    Pending,
    Lines(&'a [String]),
    Listing {
        entries: &'a [FileEntry],
        total: usize,
    },
    Notice(&'a str),
}

/// The open prompt as drawn on the last line.
#[derive(Debug, Clone)]
pub struct PromptView<'a> {
    pub label: String,
    pub buffer: &'a str,
    pub cursor: usize,
}

/// Everything the ui draws for one frame.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub path_label: String,
    pub rows: Vec<RowView<'a>>,
    /// Row of the cursor inside `rows`.
    pub cursor_row: Option<usize>,
    /// `index/len` for the list title.
    pub position: String,
    pub preview: PreviewView<'a>,
    pub preview_title: String,
    pub preview_scroll: usize,
    /// Marked preview lines, as indices into the shown lines.
    pub preview_mark: Option<RangeInclusive<usize>>,
    pub focus: Focus,
    pub mode_label: String,
    pub sort_label: String,
    pub register_label: Option<String>,
    pub status: Option<&'a StatusMessage>,
    pub prompt: Option<PromptView<'a>>,
    pub show_help: bool,
}

impl<'a> AppState<'a> {
    pub fn render_request(&self) -> RenderRequest<'_> {
        let nav = &self.nav;
        let len = nav.entries().len();
        let cursor = nav.cursor();
        let range = cursor.visible_range(len, self.metrics.list_rows());
        let dir_marker = self.config.display().dir_marker();
        let register = self.register.as_ref();
        let by_mtime = nav.sort().key == SortKey::Modified;

        let rows: Vec<RowView> = nav.entries()[range.clone()]
            .iter()
            .zip(range.clone())
            .map(|(entry, idx)| {
                let name = if dir_marker && entry.is_dir() {
                    Cow::Owned(format!("{}/", entry.name_str()))
                } else {
                    entry.name_str()
                };
                RowView {
                    entry,
                    name,
                    info: if by_mtime {
                        format_file_time(entry.modified())
                    } else {
                        format_file_size(entry.size(), entry.is_dir())
                    },
                    is_cursor: idx == cursor.index(),
                    selected: self.selection.contains(entry.path()),
                    staged: register.is_some_and(|r| r.contains(entry.path())),
                }
            })
            .collect();

        let cursor_row = (len > 0 && range.contains(&cursor.index()))
            .then(|| cursor.index() - range.start);

        let position = if len == 0 {
            "0/0".to_string()
        } else {
            format!("{}/{}", cursor.index() + 1, len)
        };

        RenderRequest {
            path_label: shorten_home_path(nav.current_dir()),
            rows,
            cursor_row,
            position,
            preview: self.preview_view(),
            preview_title: self.preview_title(),
            preview_scroll: self.preview.scroll(),
            preview_mark: self.preview.line_mark().map(|m| m.range()),
            focus: self.modes.focus(),
            mode_label: match self.preview.line_mark() {
                Some(_) => "PREVIEW VISUAL".to_string(),
                None => self.modes.label(),
            },
            sort_label: nav.sort().label(),
            register_label: register.map(|r| r.label()),
            status: self.status.as_ref(),
            prompt: self.prompt.as_ref().map(|p| PromptView {
                label: p.kind().label(),
                buffer: p.buffer(),
                cursor: p.cursor(),
            }),
            show_help: self.show_help,
        }
    }

    fn preview_view(&self) -> PreviewView<'_> {
        if self.preview.showing_output()
            && let Some(lines) = self.preview.output()
        {
            return PreviewView::Lines(lines);
        }
        match self.preview.data() {
            PreviewData::Empty => PreviewView::Empty,
            PreviewData::Pending => PreviewView::Pending,
            PreviewData::File(lines) => PreviewView::Lines(lines),
            PreviewData::Directory { entries, total } => PreviewView::Listing {
                entries,
                total: *total,
            },
            PreviewData::Notice(text) => PreviewView::Notice(text),
        }
    }

    fn preview_title(&self) -> String {
        if self.preview.showing_output() {
            return "Last output".to_string();
        }
        if let Some(PromptKind::ConfirmPurge { count }) = self.prompt.as_ref().map(|p| p.kind()) {
            return format!("Purging {count} item(s)");
        }
        self.preview
            .current_path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
