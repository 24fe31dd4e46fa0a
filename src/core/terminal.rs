//! Terminal rendering and event loop for fiander.
//!
//! Handles setup/teardown of raw mode, alternate screen and mouse capture, redraws,
//! and forwards events (keypress, mouse, resize) to app logic.

use crate::app::{AppState, KeypressResult};
use crate::ui;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};

use std::io;
use std::time::{Duration, Instant};

/// Initializes the terminal in raw mode and alternate screen and runs the main event loop.
///
/// Blocks until quit. Returns an std::io::Error if terminal setup or teardown fails.
pub fn run_terminal(app: &mut AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    )?;
    result
}

/// Best effort terminal restore, used by the panic hook.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
}

/// Main event loop of fiander: draws UI, polls for events and dispatches them to the app.
/// Returns on quit
fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> io::Result<()>
where
    io::Error: From<<B as Backend>::Error>,
{
    let mut dirty = true;
    loop {
        dirty |= app.tick(Instant::now());

        if dirty {
            terminal.draw(|f| ui::render(f, app))?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        let result = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_keypress(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Resize(_, _) => KeypressResult::Consumed,
            _ => KeypressResult::Continue,
        };

        match result {
            KeypressResult::Quit => break,
            KeypressResult::OpenedEditor | KeypressResult::Recovered => {
                // full clear/reset
                terminal.clear()?;
                dirty = true;
            }
            KeypressResult::Consumed => dirty = true,
            KeypressResult::Continue => {}
        }
    }
    Ok(())
}
