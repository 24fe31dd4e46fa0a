//! Helpers for fiander.
//!
//! Small utility functions used throughout fiander:
//! - Color parsing from strings or hex codes
//! - Opening files in the user's chosen editor
//! - Generating unused filenames to prevent accidental overwrite
//! - Home directory expansion and shortening for display

use crate::config::Editor;

use ratatui::style::Color;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::{fs, io};

/// Parses a string (color name or hex) into a ratatui::style::Color
///
/// Supports standard names (red, green, etc.) as well as hex values (#RRGGBB or #RGB)
pub fn parse_color(s: &str) -> Color {
    let lower = s.trim().to_lowercase();
    match lower.as_str() {
        "default" | "reset" | "" => Color::Reset,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "blue" => Color::Blue,
        "green" => Color::Green,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "black" => Color::Black,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightblue" => Color::LightBlue,
        "lightyellow" => Color::LightYellow,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        other => {
            if let Some(hex) = other.strip_prefix('#') {
                let expanded = match hex.len() {
                    6 => hex.to_owned(),
                    3 => hex.chars().flat_map(|c| [c, c]).collect(),
                    _ => return Color::Reset,
                };
                if let Ok(rgb) = u32::from_str_radix(&expanded, 16) {
                    return Color::Rgb(
                        ((rgb >> 16) & 0xFF) as u8,
                        ((rgb >> 8) & 0xFF) as u8,
                        (rgb & 0xFF) as u8,
                    );
                }
            } else if let Ok(idx) = other.parse::<u8>() {
                return Color::Indexed(idx);
            }
            Color::Reset
        }
    }
}

/// Opens a file in the configured editor ("nvim", "code -w" etc.).
///
/// Temporarily disables raw mode and leaves the alternate screen while the editor runs.
/// On return, restores both, even if the editor failed to start.
pub fn open_in_editor(editor: &Editor, file_path: &Path) -> io::Result<()> {
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };

    let cmd = editor.cmd();
    let mut parts = cmd.split_whitespace();
    let program = parts.next().unwrap_or("vim");

    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen)?;

    let status = std::process::Command::new(program)
        .args(parts)
        .arg(file_path)
        .status();

    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    enable_raw_mode()?;

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(io::Error::other(format!("{program} exited with {s}"))),
        Err(e) => Err(e),
    }
}

/// Finds the next available filename by appending _1, _2, etc. if the target exists
///
/// Example: "notes.txt" -> "notes_1.txt"
pub fn get_unused_path(path: &Path) -> PathBuf {
    if !path.exists() && path.symlink_metadata().is_err() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = path.file_name().unwrap_or_default();

    let stem = Path::new(name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let ext = Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let target = parent.join(format!("{stem}_{counter}{ext}"));
        if !target.exists() && target.symlink_metadata().is_err() {
            return target;
        }
        counter += 1;
    }
}

/// Recursively copies files and directories from `src` to `dest`.
///
/// Symlinks are copied as links where the platform allows it.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(src)?;

    #[cfg(unix)]
    if meta.file_type().is_symlink() {
        let target = fs::read_link(src)?;
        return std::os::unix::fs::symlink(target, dest);
    }

    if meta.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}

/// Removes a file, a symlink or a whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[inline]
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expands a user typed path.
///
/// Empty input means the home directory, a leading `~` is replaced by it,
/// and relative paths are joined onto `base`.
pub fn expand_home_path(input: &str, base: &Path) -> PathBuf {
    let input = input.trim();
    let home = get_home();

    if input.is_empty() || input == "~" {
        return home.unwrap_or_else(|| base.to_path_buf());
    }

    if let Some(rest) = input
        .strip_prefix("~/")
        .or_else(|| input.strip_prefix(&format!("~{MAIN_SEPARATOR}")))
        && let Some(home) = home
    {
        return home.join(rest);
    }

    let path = Path::new(input);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Resolves the directory fiander starts in from the CLI argument.
///
/// A file argument opens its parent directory.
pub fn resolve_initial_dir(arg: &str) -> io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let target = expand_home_path(arg, &cwd);
    let target = fs::canonicalize(&target)?;
    if target.is_dir() {
        return Ok(target);
    }
    match target.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", target.display()),
        )),
    }
}

/// Util function to shorten home directory to ~.
/// Used by the path bar at the top of the list pane.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        let mut short = stripped.display().to_string();
        if short.starts_with(MAIN_SEPARATOR) {
            short.remove(0);
        }
        return format!("~{}{}", MAIN_SEPARATOR, short);
    }
    path.display().to_string()
}
