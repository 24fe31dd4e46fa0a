//! UI renderer implementation.
//!
//! Contains the top-level `render` entry point used by the terminal loop and the
//! layout helpers that split the screen into header, list, preview and status line.
//!
//! This module should stay “pure rendering”: it reports the pane areas back to the session,
//! asks it for a [crate::app::RenderRequest] and draws that.

use crate::app::{AppState, Focus, LayoutMetrics};
use crate::config::Config;
use crate::ui::{panes, widgets};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
};

/// Smallest terminal the two pane layout is drawn in.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 8;

/// Renders the entire terminal UI for fiander on each frame.
pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        frame.render_widget(
            Paragraph::new(format!(
                "Terminal too small ({}x{}), need {MIN_WIDTH}x{MIN_HEIGHT}",
                area.width, area.height
            ))
            .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let config = app.config();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    let (header, body, footer) = (rows[0], rows[1], rows[2]);

    let (list_area, preview_area) = layout_chunks(body, config);
    let focus = app.modes().focus();
    let list_block = pane_block(config, " Files ", focus == Focus::List);
    let preview_block = pane_block(config, " Preview ", focus == Focus::Preview);

    let metrics = LayoutMetrics {
        list: list_block.inner(list_area),
        preview: preview_area.map(|a| preview_block.inner(a)).unwrap_or_default(),
    };
    app.update_layout(metrics);

    let theme = config.theme();
    let req = app.render_request();

    widgets::draw_header(frame, header, &req, theme);

    let list_block = if config.display().has_borders() {
        list_block.title_bottom(format!(" {} ", req.position))
    } else {
        list_block
    };
    frame.render_widget(list_block, list_area);
    panes::draw_list(frame, metrics.list, &req, theme);

    if let Some(area) = preview_area {
        let preview_block = if config.display().titles() && !req.preview_title.is_empty() {
            preview_block.title(format!(" {} ", req.preview_title))
        } else {
            preview_block
        };
        frame.render_widget(preview_block, area);
        panes::draw_preview(frame, metrics.preview, &req, theme);
    }

    widgets::draw_status_line(frame, footer, &req, theme);

    if req.show_help {
        widgets::draw_help(frame, body, theme);
    }
}

/// Splits the body into the list pane and, when enabled, the preview pane.
pub fn layout_chunks(body: Rect, config: &Config) -> (Rect, Option<Rect>) {
    let display = config.display();
    if !display.preview() {
        return (body, None);
    }
    let (list, preview) = display.ratios();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(list), Constraint::Percentage(preview)])
        .split(body);
    (chunks[0], Some(chunks[1]))
}

fn pane_block(config: &Config, title: &'static str, focused: bool) -> Block<'static> {
    let display = config.display();
    let mut block = Block::default();
    if display.has_borders() {
        block = block
            .borders(Borders::ALL)
            .border_type(display.border_shape().as_border_type())
            .border_style(config.theme().border_style(focused));
    }
    if display.titles() {
        block = block.title(title);
    }
    block
}
