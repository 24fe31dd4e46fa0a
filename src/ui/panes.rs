//! UI pane drawing module for fiander.
//!
//! This module draws the list and preview panes from a [RenderRequest].
//! Highlighting of the cursor, the visual range, staged entries and file type colouring is
//! handled here. Blocks and borders are drawn by ui::render; these functions fill the inner area.

use crate::app::{PreviewView, RenderRequest, RowView};
use crate::config::Theme;
use crate::core::{FileEntry, sanitize_to_exact_width};

use ansi_to_tui::IntoText;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

const STAGED_MARKER: &str = "+";

/// Base style of an entry by its type.
fn entry_style(entry: &FileEntry, theme: &Theme) -> Style {
    if entry.is_dir() {
        let style = theme.directory_style();
        if entry.is_symlink() {
            return style.fg(theme.symlink());
        }
        return style;
    }
    if entry.is_broken_sym() {
        return theme.entry_style().fg(Color::Red);
    }
    if entry.is_symlink() {
        return theme.entry_style().fg(theme.symlink());
    }
    if entry.is_executable() {
        return theme.entry_style().fg(theme.executable());
    }
    theme.entry_style()
}

/// Overlays the cursor, visual and staged highlight on a base style.
fn row_style(row: &RowView, theme: &Theme) -> Style {
    let mut style = entry_style(row.entry, theme);
    if row.staged {
        style = style.patch(theme.staged_style());
    }
    if row.selected {
        style = style.patch(theme.visual_style());
    }
    if row.is_cursor && !row.selected {
        style = style.patch(theme.cursor_style());
    }
    style
}

/// One list row: marker column, name filling the width and the info column right aligned.
fn make_entry_line<'a>(row: &RowView, width: usize, theme: &Theme) -> Line<'a> {
    let style = row_style(row, theme);
    let marker = if row.staged { STAGED_MARKER } else { " " };

    let info_width = row.info.width();
    let info_col = if info_width > 0 && width > info_width + 8 {
        info_width + 1
    } else {
        0
    };
    let name_width = width.saturating_sub(1 + info_col);

    let mut spans = Vec::with_capacity(3);
    spans.push(Span::styled(marker.to_string(), style));
    spans.push(Span::styled(
        sanitize_to_exact_width(&row.name, name_width),
        style,
    ));
    if info_col > 0 {
        spans.push(Span::styled(format!(" {}", row.info), style));
    }
    Line::from(spans)
}

/// Draws the list of entries visible in the window.
pub fn draw_list(frame: &mut Frame, area: Rect, req: &RenderRequest, theme: &Theme) {
    if req.rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(" [Empty]", theme.notice_style()))),
            area,
        );
        return;
    }

    let width = area.width as usize;
    let lines: Vec<Line> = req
        .rows
        .iter()
        .map(|row| make_entry_line(row, width, theme))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Draws the preview pane: file lines, a directory listing or a notice.
pub fn draw_preview(frame: &mut Frame, area: Rect, req: &RenderRequest, theme: &Theme) {
    let rows = area.height as usize;
    let scroll = req.preview_scroll;

    match req.preview {
        PreviewView::Empty => {}
        PreviewView::Pending => draw_notice(frame, area, "Loading…", theme),
        PreviewView::Notice(text) => draw_notice(frame, area, text, theme),
        PreviewView::Lines(lines) => {
            let start = scroll.min(lines.len());
            let end = (start + rows).min(lines.len());
            let raw = lines[start..end].join("\n");
            let mut text = raw.into_text().unwrap_or_else(|_| Text::from(raw));
            if let Some(mark) = &req.preview_mark {
                for (idx, line) in (start..).zip(text.lines.iter_mut()) {
                    if mark.contains(&idx) {
                        line.style = line.style.patch(theme.visual_style());
                    }
                }
            }
            frame.render_widget(Paragraph::new(text), area);
        }
        PreviewView::Listing { entries, total } => {
            if entries.is_empty() {
                draw_notice(frame, area, "[Empty]", theme);
                return;
            }
            let width = area.width as usize;
            let start = scroll.min(entries.len());
            let mut lines: Vec<Line> = entries[start..]
                .iter()
                .take(rows)
                .map(|entry| {
                    let name = entry.name_str();
                    let name = if entry.is_dir() {
                        format!("{name}/")
                    } else {
                        name.into_owned()
                    };
                    Line::from(Span::styled(
                        sanitize_to_exact_width(&format!(" {name}"), width),
                        entry_style(entry, theme),
                    ))
                })
                .collect();

            let hidden = total.saturating_sub(entries.len());
            if hidden > 0 && start + lines.len() == entries.len() && lines.len() < rows {
                lines.push(Line::from(Span::styled(
                    format!(" … {hidden} more"),
                    theme.notice_style(),
                )));
            }
            frame.render_widget(Paragraph::new(lines), area);
        }
    }
}

fn draw_notice(frame: &mut Frame, area: Rect, text: &str, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {text}"),
            theme.notice_style(),
        ))),
        area,
    );
}
