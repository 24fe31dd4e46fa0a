//! Sorting, filtering, and display formatting for file entries in fiander.
//!
//! The [Formatter] struct holds the rules for sorting and filtering entries,
//! based on user preferences from the fiander.toml configuration.
//!
//! Also holds the small text helpers shared by the preview and export code.

use crate::core::FileEntry;
use crate::core::listing::SortSpec;

use chrono::{DateTime, Local};
use humansize::{DECIMAL, format_size};
use unicode_width::UnicodeWidthChar;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

/// Bytes to peek for null bytes in binary detection.
pub const BINARY_PEEK_BYTES: usize = 4096;

/// Formatter struct to handle sorting and filtering of file entries
/// based on user preferences.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    sort: SortSpec,
    show_hidden: bool,
}

impl Formatter {
    pub fn new(sort: SortSpec, show_hidden: bool) -> Self {
        Self { sort, show_hidden }
    }

    /// Sorts the given file entries in place according to the formatter's settings.
    pub fn sort_entries(&self, entries: &mut [FileEntry]) {
        entries.sort_by(|a, b| self.sort.compare(a, b));
    }

    /// Filters the given file entries in place according to the formatter's settings.
    pub fn filter_entries(&self, entries: &mut Vec<FileEntry>) {
        if !self.show_hidden {
            entries.retain(|e| !e.is_hidden());
        }
        self.sort_entries(entries);
    }
}

/// Formats the file size into a human-readable string.
/// # Returns
/// A string representing the formatted file size or "-" for directories.
pub fn format_file_size(size: u64, is_dir: bool) -> String {
    if is_dir {
        "-".into()
    } else {
        format_size(size, DECIMAL)
    }
}

/// Formats the file modification time into a human-readable string.
/// # Returns
/// A string representing the formatted modification time or "-" if unknown.
pub fn format_file_time(modified: Option<SystemTime>) -> String {
    modified
        .map(|mtime| {
            let dt: DateTime<Local> = DateTime::from(mtime);
            dt.format("%Y-%m-%d %H:%M").to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Clean the output to the width of the pane
/// by removing control characters, expanding tabs to 4 spaces,
/// and truncating or padding the string to fit exactly.
/// # Returns
/// A sanitized string that fits exactly within the specified pane width.
pub fn sanitize_to_exact_width(line: &str, pane_width: usize) -> String {
    let mut out = String::with_capacity(pane_width);
    let mut current_w = 0;

    for char in line.chars() {
        if char == '\t' {
            let space_count = 4 - (current_w % 4);
            if current_w + space_count > pane_width {
                break;
            }
            out.push_str(&" ".repeat(space_count));
            current_w += space_count;
            continue;
        }

        if char.is_control() {
            continue;
        }

        let w = char.width().unwrap_or(0);
        if current_w + w > pane_width {
            break;
        }

        out.push(char);
        current_w += w;
    }

    if current_w < pane_width {
        out.push_str(&" ".repeat(pane_width - current_w));
    }

    out
}

/// True if `bytes` looks like binary content (a NUL byte in the peek window).
#[inline]
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_PEEK_BYTES)].contains(&0)
}

/// Reads the first [BINARY_PEEK_BYTES] of a file and checks them with [is_binary].
pub fn sniff_binary(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; BINARY_PEEK_BYTES];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(is_binary(&buf[..filled]))
}

/// Normalize a relative path to use forward slashes for consistency across platforms.
pub fn normalize_relative_path(path: &Path) -> String {
    let rel = path.to_string_lossy().into_owned();
    #[cfg(windows)]
    {
        rel.replace('\\', "/")
    }
    #[cfg(not(windows))]
    {
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_ui_sanitization_and_exact_width() {
        let pane_width = 10;

        let cases = vec![
            ("short.txt", 10),
            ("very_long_filename.txt", 10),
            ("🦀_crab.rs", 10),
            ("\t_tab", 10),
        ];

        for (input, expected_width) in cases {
            let result = sanitize_to_exact_width(input, pane_width);
            let actual_width = unicode_width::UnicodeWidthStr::width(result.as_str());

            assert_eq!(
                actual_width, expected_width,
                "Failed to produce exact width for input: '{}'. Result was: '{}' (width: {})",
                input, result, actual_width
            );
            assert!(
                !result.chars().any(|c| c.is_control() && c != ' '),
                "Result contains control characters: {:?}",
                result
            );
        }
    }

    #[test]
    fn binary_sniff_finds_nul_bytes() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let text = dir.path().join("text.txt");
        let bin = dir.path().join("bin.dat");
        fs::write(&text, "plain words\n")?;
        fs::write(&bin, [0x7f, b'E', b'L', b'F', 0, 1, 2])?;

        assert!(!sniff_binary(&text)?);
        assert!(sniff_binary(&bin)?);
        Ok(())
    }

    #[test]
    fn nul_beyond_peek_window_is_text() {
        let mut bytes = vec![b'a'; BINARY_PEEK_BYTES];
        bytes.push(0);
        assert!(!is_binary(&bytes));
    }

    #[test]
    fn sizes_format_for_files_only() {
        assert_eq!(format_file_size(2000, true), "-");
        assert_eq!(format_file_size(2000, false), "2 kB");
        assert_eq!(format_file_time(None), "-");
    }
}
