//! Export (catlsr) tests for fiander
//!
//! The blob layout is checked end to end: through [ExportJob] directly and through a session,
//! where the finished export lands on the clipboard and in the output pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fiander::app::{AppState, Services};
use fiander::config::Config;
use fiander::core::export::{BINARY_PLACEHOLDER, DEFAULT_PREAMBLE, EMPTY_EXPORT, SPLITTER};
use fiander::core::{ExportJob, ExportRules, MemoryClipboard, RegisterOp};
use std::fs;
use std::time::Instant;
use tempfile::tempdir;

fn section(rel: &str, content: &str) -> String {
    format!("{SPLITTER}\n{rel}\n{SPLITTER}\n{content}\n")
}

fn drive(app: &mut AppState) {
    let mut guard = 0;
    while app.is_exporting() && guard < 10_000 {
        app.tick(Instant::now());
        guard += 1;
    }
}

#[test]
fn test_blob_layout_with_default_preamble() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::write(temp.path().join("notes.txt"), "hello")?;
    fs::write(temp.path().join("pic.bin"), [0u8, 159, 146, 150])?;

    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;

    let expected = format!(
        "{DEFAULT_PREAMBLE}{}{}",
        section("notes.txt", "hello"),
        section("pic.bin", BINARY_PLACEHOLDER)
    );
    assert_eq!(output.blob, expected);
    assert_eq!(output.files, 2);
    Ok(())
}

#[test]
fn test_nested_files_after_top_level_ones() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::create_dir_all(temp.path().join("src").join("deep"))?;
    fs::write(temp.path().join("src").join("deep").join("x.rs"), "fn x() {}")?;
    fs::write(temp.path().join("src").join("lib.rs"), "mod deep;")?;
    fs::write(temp.path().join("README"), "readme")?;

    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, "intro")?;

    let expected = format!(
        "intro\n{}{}{}",
        section("README", "readme"),
        section("src/lib.rs", "mod deep;"),
        section("src/deep/x.rs", "fn x() {}")
    );
    assert_eq!(output.blob, expected);
    Ok(())
}

#[test]
fn test_ignored_directories_and_patterns() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::create_dir(temp.path().join("node_modules"))?;
    fs::write(temp.path().join("node_modules").join("dep.js"), "x")?;
    fs::create_dir(temp.path().join(".git"))?;
    fs::write(temp.path().join(".git").join("HEAD"), "ref")?;
    fs::write(temp.path().join("debug.log"), "noise")?;
    fs::write(temp.path().join("logo.SVG"), "<svg/>")?;
    fs::write(temp.path().join("main.py"), "print()")?;

    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;

    assert_eq!(output.files, 1);
    assert!(output.blob.contains("main.py"));
    assert!(!output.blob.contains("dep.js"));
    assert!(!output.blob.contains("HEAD"));
    assert!(!output.blob.contains("debug.log"));
    assert!(!output.blob.contains("logo.SVG"));
    Ok(())
}

#[test]
fn test_gitignore_is_honoured() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::write(temp.path().join(".gitignore"), "generated/\n*.secret\n")?;
    fs::create_dir(temp.path().join("generated"))?;
    fs::write(temp.path().join("generated").join("out.txt"), "gen")?;
    fs::write(temp.path().join("key.secret"), "hunter2")?;
    fs::write(temp.path().join("kept.txt"), "kept")?;

    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;

    assert!(output.blob.contains(&section("kept.txt", "kept")));
    assert!(!output.blob.contains("out.txt"));
    assert!(!output.blob.contains("hunter2"));
    Ok(())
}

#[test]
fn test_preamble_file_opens_the_blob() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    fs::write(temp.path().join("prepromt.txt"), "Review this code")?;
    fs::write(temp.path().join("a.txt"), "a")?;

    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;

    assert_eq!(
        output.blob,
        format!("Review this code\n{}", section("a.txt", "a"))
    );
    assert_eq!(output.preamble, "Review this code\n");
    Ok(())
}

#[test]
fn test_empty_directory_export() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let output = ExportJob::run_to_end(temp.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;
    assert_eq!(output.blob, format!("{DEFAULT_PREAMBLE}{EMPTY_EXPORT}\n"));
    assert_eq!(output.files, 0);
    Ok(())
}

#[test]
fn test_session_export_reaches_clipboard_and_output() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::create_dir(temp.path().join("proj"))?;
    fs::write(temp.path().join("proj").join("notes.txt"), "hello")?;
    fs::write(temp.path().join("top.txt"), "top")?;

    let clipboard = MemoryClipboard::new();
    let mut app = AppState::with_services(&config, temp.path(), Services::headless(clipboard.clone()))?;

    // cursor is on proj/, so X exports that directory
    app.handle_keypress(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
    assert!(app.is_exporting());
    drive(&mut app);

    let expected = format!("{DEFAULT_PREAMBLE}{}", section("notes.txt", "hello"));
    assert_eq!(clipboard.last_text().as_deref(), Some(expected.as_str()));

    let register = app.register().ok_or("export should fill the register")?;
    assert_eq!(register.op(), RegisterOp::Export);
    assert_eq!(register.blob(), Some(expected.as_str()));
    assert_eq!(register.preamble(), Some(DEFAULT_PREAMBLE));

    app.handle_keypress(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
    assert!(app.preview().showing_output());
    assert_eq!(app.preview().output().map(|l| l.len()), Some(expected.lines().count()));
    Ok(())
}

#[test]
fn test_catlsr_command_exports_current_directory() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::write(temp.path().join("only.txt"), "only")?;

    let clipboard = MemoryClipboard::new();
    let mut app = AppState::with_services(&config, temp.path(), Services::headless(clipboard.clone()))?;

    for c in ":catlsr".chars() {
        app.handle_keypress(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    app.handle_keypress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    drive(&mut app);

    let text = clipboard.last_text().ok_or("nothing on the clipboard")?;
    assert!(text.ends_with(&section("only.txt", "only")));
    Ok(())
}

#[test]
fn test_esc_cancels_a_running_export() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let temp = tempdir()?;
    fs::write(temp.path().join("a.txt"), "a")?;

    let clipboard = MemoryClipboard::new();
    let mut app = AppState::with_services(&config, temp.path(), Services::headless(clipboard.clone()))?;

    for c in ":catlsr".chars() {
        app.handle_keypress(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    app.handle_keypress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert!(app.is_exporting());

    app.handle_keypress(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert!(!app.is_exporting());
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Export cancelled")
    );
    assert!(clipboard.last_text().is_none());
    assert!(app.register().is_none());
    Ok(())
}
