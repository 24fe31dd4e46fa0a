//! Header, status line and the key help popup.

use crate::app::{RenderRequest, StatusLevel};
use crate::config::Theme;
use crate::utils::cli::KEYBINDS_TEXT;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Current directory on the left, sort order on the right.
pub fn draw_header(frame: &mut Frame, area: Rect, req: &RenderRequest, theme: &Theme) {
    let sort = format!("{} ", req.sort_label);
    let sort_width = sort.width() as u16;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(sort_width)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", req.path_label),
            theme.path_style(),
        )),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(sort, theme.status_line_style())),
        chunks[1],
    );
}

/// Mode and register on the left, the status message after them.
/// An open prompt takes over the whole line and places the terminal cursor.
pub fn draw_status_line(frame: &mut Frame, area: Rect, req: &RenderRequest, theme: &Theme) {
    if let Some(prompt) = &req.prompt {
        let line = Line::from(vec![
            Span::styled(prompt.label.clone(), theme.mode_style()),
            Span::raw(prompt.buffer),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        let offset: usize = prompt.label.width()
            + prompt
                .buffer
                .chars()
                .take(prompt.cursor)
                .map(|c| c.width().unwrap_or(0))
                .sum::<usize>();
        let x = area.x + (offset as u16).min(area.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, area.y));
        return;
    }

    let mut spans = vec![Span::styled(
        format!(" {} ", req.mode_label),
        theme.mode_style(),
    )];
    if let Some(register) = &req.register_label {
        spans.push(Span::styled(
            format!(" [{register}]"),
            theme.staged_style(),
        ));
    }
    if let Some(status) = req.status {
        let style = match status.level {
            StatusLevel::Error => theme.status_line_style().fg(Color::Red),
            StatusLevel::Warn => theme.notice_style(),
            StatusLevel::Info => theme.status_line_style(),
        };
        spans.push(Span::styled(format!("  {}", status.text), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered popup listing the key bindings. Any key closes it.
pub fn draw_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(5),
            Constraint::Percentage(90),
            Constraint::Percentage(5),
        ])
        .split(area);

    let popup_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Percentage(70),
            Constraint::Percentage(15),
        ])
        .split(vertical_chunks[1])[1];

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(theme.border_style(true));

    let lines: Vec<Line> = KEYBINDS_TEXT
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .map(Line::raw)
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}
