//! Clipboard register tests for fiander
//!
//! Staging never touches the filesystem; files only change on paste or a confirmed purge.
//! Each test builds its own temporary tree and drives a headless session with key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fiander::app::{AppState, Mode, Services, StatusLevel};
use fiander::config::Config;
use fiander::core::clipboard::ClipboardCall;
use fiander::core::{MemoryClipboard, RegisterOp};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn press(app: &mut AppState, keys: &str) {
    for c in keys.chars() {
        app.handle_keypress(key(c));
    }
}

fn enter(app: &mut AppState) {
    app.handle_keypress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
}

/// `sub/`, `a.txt`, `b.txt` in listing order.
fn tree() -> Result<TempDir, Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::create_dir(temp.path().join("sub"))?;
    fs::write(temp.path().join("a.txt"), "alpha")?;
    fs::write(temp.path().join("b.txt"), "bravo")?;
    Ok(temp)
}

fn session<'a>(
    config: &'a Config,
    path: &Path,
    clipboard: MemoryClipboard,
) -> std::io::Result<AppState<'a>> {
    AppState::with_services(config, path, Services::headless(clipboard))
}

#[test]
fn test_cut_moves_on_paste_only() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let clipboard = MemoryClipboard::new();
    let mut app = session(&config, temp.path(), clipboard.clone())?;

    press(&mut app, "jjdd");
    assert!(temp.path().join("b.txt").exists());
    assert_eq!(app.register().map(|r| r.op()), Some(RegisterOp::Cut));
    assert_eq!(
        clipboard.calls(),
        vec![ClipboardCall::Paths(
            RegisterOp::Cut,
            vec![temp.path().join("b.txt")]
        )]
    );

    press(&mut app, "ggl");
    assert_eq!(app.nav().current_dir(), temp.path().join("sub"));
    press(&mut app, "p");

    assert!(!temp.path().join("b.txt").exists());
    assert_eq!(fs::read_to_string(temp.path().join("sub").join("b.txt"))?, "bravo");
    assert!(app.register().is_none(), "a fully applied cut is spent");
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Moved 1 item(s)")
    );
    assert_eq!(app.nav().entries().len(), 1);
    Ok(())
}

#[test]
fn test_missing_source_is_reported_and_kept() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "jvjdd");
    assert_eq!(app.register().map(|r| r.len()), Some(2));
    assert_eq!(app.mode(), Mode::Normal);

    fs::remove_file(temp.path().join("a.txt"))?;

    press(&mut app, "ggl");
    press(&mut app, "p");

    assert!(temp.path().join("sub").join("b.txt").exists());
    let status = app.status().ok_or("no status")?;
    assert_eq!(status.level, StatusLevel::Error);
    assert!(
        status.text.starts_with("Moved 1/2; failed: a.txt"),
        "unexpected status: {}",
        status.text
    );

    let register = app.register().ok_or("failed entry should stay staged")?;
    assert_eq!(register.paths(), vec![temp.path().join("a.txt")]);
    Ok(())
}

#[test]
fn test_copy_register_survives_paste() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "jyy");
    press(&mut app, "ggl");
    press(&mut app, "p");
    press(&mut app, "p");

    let copies = fs::read_dir(temp.path().join("sub"))?.count();
    assert_eq!(copies, 2, "second paste gets a fresh name");
    assert!(temp.path().join("a.txt").exists());
    assert_eq!(app.register().map(|r| r.op()), Some(RegisterOp::Copy));
    Ok(())
}

#[test]
fn test_purge_deletes_after_confirmation() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "jdd");
    app.handle_keypress(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
    assert_eq!(app.mode(), Mode::Prompt);
    assert!(temp.path().join("a.txt").exists());

    press(&mut app, "y");
    enter(&mut app);

    assert!(!temp.path().join("a.txt").exists());
    assert!(temp.path().join("b.txt").exists());
    assert!(app.register().is_none());
    assert_eq!(app.mode(), Mode::Normal);
    Ok(())
}

#[test]
fn test_purge_declined_keeps_files() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "jdd");
    app.handle_keypress(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
    press(&mut app, "n");
    enter(&mut app);

    assert!(temp.path().join("a.txt").exists());
    assert_eq!(app.register().map(|r| r.len()), Some(1));
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Purge cancelled")
    );
    Ok(())
}

#[test]
fn test_purge_needs_a_cut() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "jyy");
    app.handle_keypress(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
    assert_eq!(app.mode(), Mode::Normal);
    assert_eq!(app.status().map(|s| s.level), Some(StatusLevel::Warn));
    Ok(())
}

#[test]
fn test_paste_with_empty_register_warns() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tree()?;
    let mut app = session(&config, temp.path(), MemoryClipboard::new())?;

    press(&mut app, "p");
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Register is empty")
    );
    Ok(())
}
