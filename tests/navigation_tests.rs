//! Navigation tests for fiander
//!
//! These drive a headless session through key events: entering and leaving directories,
//! the back stack, re-sorting and the cursor bounds.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fiander::app::{AppState, KeypressResult, Services};
use fiander::config::Config;
use fiander::core::MemoryClipboard;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn session<'a>(config: &'a Config, path: &Path) -> std::io::Result<AppState<'a>> {
    AppState::with_services(config, path, Services::headless(MemoryClipboard::new()))
}

fn cursor_name(app: &AppState) -> Option<String> {
    app.nav()
        .selected_entry()
        .map(|e| e.name_str().into_owned())
}

#[test]
fn test_enter_and_leave_keeps_the_cursor_on_the_child() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::create_dir(temp.path().join("alpha"))?;
    fs::create_dir(temp.path().join("beta"))?;
    fs::write(temp.path().join("beta").join("inner.txt"), "x")?;
    fs::write(temp.path().join("zeta.txt"), "z")?;

    let mut app = session(&config, temp.path())?;
    assert_eq!(cursor_name(&app).as_deref(), Some("alpha"));

    app.handle_keypress(key('j'));
    app.handle_keypress(key('l'));
    assert_eq!(app.nav().current_dir(), temp.path().join("beta"));
    assert_eq!(cursor_name(&app).as_deref(), Some("inner.txt"));

    app.handle_keypress(key('h'));
    assert_eq!(app.nav().current_dir(), temp.path());
    assert_eq!(cursor_name(&app).as_deref(), Some("beta"));
    Ok(())
}

#[test]
fn test_back_returns_to_the_previous_directory() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::create_dir_all(temp.path().join("a").join("b"))?;

    let mut app = session(&config, temp.path())?;
    app.handle_keypress(key('l'));
    app.handle_keypress(key('l'));
    assert_eq!(app.nav().current_dir(), temp.path().join("a").join("b"));

    app.handle_keypress(key('-'));
    assert_eq!(app.nav().current_dir(), temp.path().join("a"));
    app.handle_keypress(key('-'));
    assert_eq!(app.nav().current_dir(), temp.path());
    Ok(())
}

#[test]
fn test_resort_keeps_the_cursor_on_its_entry() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::write(temp.path().join("a_large.txt"), "x".repeat(4096))?;
    fs::write(temp.path().join("b_small.txt"), "x")?;
    fs::write(temp.path().join("c_medium.txt"), "x".repeat(256))?;

    let mut app = session(&config, temp.path())?;
    app.handle_keypress(code(KeyCode::Home));
    assert_eq!(cursor_name(&app).as_deref(), Some("a_large.txt"));

    // name -> size
    app.handle_keypress(key('s'));
    assert_eq!(app.nav().sort().label(), "size");
    assert_eq!(cursor_name(&app).as_deref(), Some("a_large.txt"));
    assert_eq!(app.nav().selected_idx(), 2);

    app.handle_keypress(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT));
    assert_eq!(app.nav().sort().label(), "size (rev)");
    assert_eq!(cursor_name(&app).as_deref(), Some("a_large.txt"));
    assert_eq!(app.nav().selected_idx(), 0);
    Ok(())
}

#[test]
fn test_cursor_clamps_at_both_ends() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    for name in ["one", "two", "three"] {
        fs::write(temp.path().join(name), name)?;
    }

    let mut app = session(&config, temp.path())?;
    app.handle_keypress(key('k'));
    assert_eq!(app.nav().selected_idx(), 0);

    for _ in 0..10 {
        app.handle_keypress(key('j'));
    }
    assert_eq!(app.nav().selected_idx(), 2);
    Ok(())
}

#[test]
fn test_hidden_files_toggle() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::write(temp.path().join(".secret"), "")?;
    fs::write(temp.path().join("visible"), "")?;

    let mut app = session(&config, temp.path())?;
    let shown_at_start = app.nav().entries().len();

    app.handle_keypress(key('.'));
    let toggled = app.nav().entries().len();
    assert_ne!(shown_at_start, toggled);
    assert_eq!(shown_at_start.max(toggled), 2);
    assert_eq!(shown_at_start.min(toggled), 1);
    Ok(())
}

#[test]
fn test_quit_key() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    let mut app = session(&config, temp.path())?;
    assert_eq!(app.handle_keypress(key('q')), KeypressResult::Quit);
    Ok(())
}
