//! Preview highlighters.
//!
//! [Highlighter] is the seam the preview worker calls. [PlainHighlighter] reads the file
//! itself; [BatHighlighter] shells out to `bat` and falls back to plain reading when `bat` is
//! missing or fails.

use crate::core::error::PreviewError;
use crate::core::formatter::is_binary;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Seek};
use std::ops::RangeInclusive;
use std::path::Path;
use std::process::{Command, Stdio};

// Maximum file size allowed for preview (10mb)
const MAX_PREVIEW_SIZE: u64 = 10 * 1024 * 1024;
// Number of bytes to peek from file start for header checks
const HEADER_PEEK_BYTES: usize = 8;
// Longest line kept from a file before truncation
const MAX_LINE_CHARS: usize = 300;

/// Produces display lines for a file. Lines may carry ANSI colour escapes.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, path: &Path, max_lines: usize) -> Result<Vec<String>, PreviewError>;
}

/// Reads the file directly, refusing binaries and oversized files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, path: &Path, max_lines: usize) -> Result<Vec<String>, PreviewError> {
        check_previewable(path)?;

        let mut file = File::open(path)?;
        let mut header = [0u8; HEADER_PEEK_BYTES];
        let read_bytes = file.read(&mut header).unwrap_or(0);
        if read_bytes >= 5 && &header[..5] == b"%PDF-" {
            return Err(PreviewError::Binary);
        }
        file.rewind()?;

        let mut peek = Vec::with_capacity(crate::core::formatter::BINARY_PEEK_BYTES);
        (&mut file)
            .take(crate::core::formatter::BINARY_PEEK_BYTES as u64)
            .read_to_end(&mut peek)?;
        if is_binary(&peek) {
            return Err(PreviewError::Binary);
        }
        file.rewind()?;

        let reader = BufReader::new(file);
        let mut lines = Vec::with_capacity(max_lines.min(1024));
        for line in reader.split(b'\n').take(max_lines) {
            let Ok(raw) = line else {
                break;
            };
            let lossy = String::from_utf8_lossy(&raw);
            let text = lossy.strip_suffix('\r').unwrap_or(&lossy);
            lines.push(truncate_chars(text, MAX_LINE_CHARS));
        }

        if lines.is_empty() {
            lines.push("[Empty file]".to_owned());
        }
        Ok(lines)
    }
}

/// Runs `bat` with the configured arguments.
#[derive(Debug, Clone)]
pub struct BatHighlighter {
    args: Vec<OsString>,
}

impl BatHighlighter {
    pub fn new(args: Vec<OsString>) -> Self {
        Self { args }
    }

    /// True when a `bat` executable is on `PATH`.
    pub fn available() -> bool {
        which::which("bat").is_ok()
    }

    fn run_bat(&self, path: &Path, max_lines: usize) -> Result<Vec<String>, PreviewError> {
        let output = Command::new("bat")
            .args(&self.args)
            .arg(format!("--line-range=:{}", max_lines.max(1)))
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| PreviewError::Highlighter(e.to_string()))?;

        if !output.status.success() {
            return Err(PreviewError::Highlighter("bat command failed".into()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().take(max_lines).map(str::to_owned).collect())
    }
}

impl Default for BatHighlighter {
    fn default() -> Self {
        Self::new(
            ["--color=always", "--paging=never", "--style=plain", "--wrap=never"]
                .into_iter()
                .map(OsString::from)
                .collect(),
        )
    }
}

impl Highlighter for BatHighlighter {
    fn highlight(&self, path: &Path, max_lines: usize) -> Result<Vec<String>, PreviewError> {
        check_previewable(path)?;
        if crate::core::formatter::sniff_binary(path)? {
            return Err(PreviewError::Binary);
        }
        match self.run_bat(path, max_lines) {
            Ok(lines) if !lines.is_empty() => Ok(lines),
            Ok(_) => PlainHighlighter.highlight(path, max_lines),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "bat failed, plain fallback");
                PlainHighlighter.highlight(path, max_lines)
            }
        }
    }
}

/// Lines `range` of a text file, untruncated and joined by newlines.
pub fn read_line_range(path: &Path, range: RangeInclusive<usize>) -> Result<String, PreviewError> {
    check_previewable(path)?;
    if crate::core::formatter::sniff_binary(path)? {
        return Err(PreviewError::Binary);
    }

    let reader = BufReader::new(File::open(path)?);
    let count = range.end().saturating_sub(*range.start()) + 1;
    let mut lines = Vec::with_capacity(count.min(1024));
    for line in reader.split(b'\n').skip(*range.start()).take(count) {
        let raw = line?;
        let lossy = String::from_utf8_lossy(&raw);
        lines.push(lossy.strip_suffix('\r').unwrap_or(&lossy).to_owned());
    }
    Ok(lines.join("\n"))
}

fn check_previewable(path: &Path) -> Result<(), PreviewError> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(PreviewError::NotARegularFile);
    }
    if meta.len() > MAX_PREVIEW_SIZE {
        return Err(PreviewError::TooLarge(meta.len()));
    }
    Ok(())
}

fn truncate_chars(line: &str, max: usize) -> String {
    match line.char_indices().nth(max) {
        Some((idx, _)) => line[..idx].to_owned(),
        None => line.to_owned(),
    }
}
