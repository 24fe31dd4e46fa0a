//! Recursive directory-to-text export ("catlsr").
//!
//! An [ExportJob] walks a directory depth-first in sorted order and concatenates every file
//! that survives the ignore rules into one text blob:
//!
//! ```text
//! <preamble>
//! ---------------------------------------------------------------------
//! relative/path.txt
//! ---------------------------------------------------------------------
//! <content>
//! ```
//!
//! The walk is driven in chunks through [ExportJob::step] so the event loop can stay
//! responsive and cancel it; [ExportJob::run_to_end] drives it in one go.

use crate::core::error::ExportError;
use crate::core::formatter::{is_binary, normalize_relative_path};

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Frames every file header.
pub const SPLITTER: &str = "---------------------------------------------------------------------";
pub const DEFAULT_PREAMBLE: &str =
    "please analyze this project, add tell how to possibly extend it\n";
pub const BINARY_PLACEHOLDER: &str = "[binary file omitted]";
pub const EMPTY_EXPORT: &str = "[no files found (or all ignored)]";
/// Preamble files looked up at the export root, in order.
pub const PREAMBLE_FILES: [&str; 2] = ["prepromt.txt", "preprompt.txt"];

#[rustfmt::skip]
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "__pycache__", "node_modules", ".git", ".hg", ".venv", "venv", "env", ".idea",
    ".pytest_cache", "dist", "build",
];

#[rustfmt::skip]
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*.pyc", "*.pyo", "*.pyd", "*.so", "*.dll", "*.exe", "*.class", "*.jar", "*.lock",
    "*.log", "*.db", "*.sqlite", "*.bak", "*.tmp", "*.DS_Store",
];

pub const DEFAULT_IGNORE_NAMES: &[&str] = &["Thumbs.db"];

/// File extensions that are never exported, matched case-insensitively.
const SKIPPED_EXTENSIONS: &[&str] = &["svg"];

pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Ignore rules configured for every export.
#[derive(Debug, Clone)]
pub struct ExportRules {
    ignore_dirs: HashSet<String>,
    ignore_names: HashSet<String>,
    patterns: GlobSet,
    max_file_bytes: u64,
}

impl ExportRules {
    pub fn new<S: AsRef<str>>(
        ignore_dirs: &[S],
        ignore_names: &[S],
        ignore_patterns: &[S],
        max_file_bytes: u64,
    ) -> Result<Self, ExportError> {
        let mut builder = GlobSetBuilder::new();
        for pat in ignore_patterns {
            builder.add(Glob::new(pat.as_ref())?);
        }
        Ok(Self {
            ignore_dirs: ignore_dirs.iter().map(|s| s.as_ref().to_owned()).collect(),
            ignore_names: ignore_names.iter().map(|s| s.as_ref().to_owned()).collect(),
            patterns: builder.build()?,
            max_file_bytes,
        })
    }

    /// The built-in ignore lists.
    pub fn standard() -> Result<Self, ExportError> {
        Self::new(
            DEFAULT_IGNORE_DIRS,
            DEFAULT_IGNORE_NAMES,
            DEFAULT_IGNORE_PATTERNS,
            DEFAULT_MAX_FILE_BYTES,
        )
    }

    #[inline]
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }
}

struct IgnoreRule {
    matcher: GlobMatcher,
    negated: bool,
    dir_only: bool,
    by_path: bool,
}

/// Patterns from the `.gitignore` at the export root.
///
/// Unlike git, the first matching pattern decides.
#[derive(Default)]
pub struct GitIgnore {
    rules: Vec<IgnoreRule>,
}

impl GitIgnore {
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (negated, pat) = match line.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            let dir_only = pat.ends_with('/');
            let pat = pat.trim_end_matches('/');
            let pat = pat.strip_prefix('/').unwrap_or(pat);
            if pat.is_empty() {
                continue;
            }
            match Glob::new(pat) {
                Ok(glob) => rules.push(IgnoreRule {
                    matcher: glob.compile_matcher(),
                    negated,
                    dir_only,
                    by_path: pat.contains('/'),
                }),
                Err(e) => tracing::warn!(pattern = pat, error = %e, "skipping .gitignore pattern"),
            }
        }
        Self { rules }
    }

    /// Reads `root/.gitignore`, treating a missing or unreadable file as empty.
    pub fn load(root: &Path) -> Self {
        match fs::read(root.join(".gitignore")) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(_) => Self::default(),
        }
    }

    /// `Some(true)` to skip, `Some(false)` to keep, `None` when no pattern matches.
    pub fn decide(&self, rel: &str, name: &str, is_dir: bool) -> Option<bool> {
        self.rules
            .iter()
            .filter(|r| is_dir || !r.dir_only)
            .find(|r| {
                if r.by_path {
                    r.matcher.is_match(rel)
                } else {
                    r.matcher.is_match(name)
                }
            })
            .map(|r| !r.negated)
    }
}

struct ExportFilter {
    root: PathBuf,
    rules: ExportRules,
    gitignore: GitIgnore,
    preamble_file: Option<PathBuf>,
}

impl ExportFilter {
    fn should_skip(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        if self.preamble_file.as_deref() == Some(entry.path()) {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();
        if is_dir && self.rules.ignore_dirs.contains(&*name) {
            return true;
        }
        if self.rules.ignore_names.contains(&*name) {
            return true;
        }
        if self.rules.patterns.is_match(&*name) {
            return true;
        }

        let skipped_ext = !is_dir
            && Path::new(&*name)
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| SKIPPED_EXTENSIONS.contains(&ext.as_str()));
        if skipped_ext {
            return true;
        }

        let rel = relative_label(&self.root, entry.path());
        self.gitignore.decide(&rel, &name, is_dir).unwrap_or(false)
    }
}

fn relative_label(root: &Path, path: &Path) -> String {
    normalize_relative_path(path.strip_prefix(root).unwrap_or(path))
}

/// Where a chunked export stands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportProgress {
    Pending { files: usize },
    Finished { files: usize },
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub root: PathBuf,
    pub preamble: String,
    pub blob: String,
    pub files: usize,
}

type Walker = Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>;

/// A catlsr traversal in progress.
pub struct ExportJob {
    root: PathBuf,
    preamble: String,
    blob: String,
    files: usize,
    max_file_bytes: u64,
    walker: Walker,
    finished: bool,
}

impl ExportJob {
    /// Prepares an export of `root`. Nothing is traversed until [ExportJob::step].
    pub fn start(
        root: &Path,
        rules: &ExportRules,
        default_preamble: &str,
    ) -> Result<Self, ExportError> {
        if !root.is_dir() {
            return Err(ExportError::NotADirectory(root.to_path_buf()));
        }

        let (preamble, preamble_file) = read_preamble(root, default_preamble);
        let filter = Arc::new(ExportFilter {
            root: root.to_path_buf(),
            rules: rules.clone(),
            gitignore: GitIgnore::load(root),
            preamble_file,
        });

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(move |e| !filter.should_skip(e));

        let mut blob = String::with_capacity(preamble.len() + 4096);
        blob.push_str(&preamble);

        tracing::debug!(root = %root.display(), "export started");
        Ok(Self {
            root: root.to_path_buf(),
            preamble,
            blob,
            files: 0,
            max_file_bytes: rules.max_file_bytes(),
            walker: Box::new(walker),
            finished: false,
        })
    }

    /// Processes up to `budget` walk entries.
    pub fn step(&mut self, budget: usize) -> ExportProgress {
        if self.finished {
            return ExportProgress::Finished { files: self.files };
        }

        for _ in 0..budget.max(1) {
            match self.walker.next() {
                Some(Ok(entry)) => self.append(&entry),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "export skipped an unreadable entry");
                }
                None => {
                    if self.files == 0 {
                        self.blob.push_str(EMPTY_EXPORT);
                        self.blob.push('\n');
                    }
                    self.finished = true;
                    tracing::info!(root = %self.root.display(), files = self.files, "export finished");
                    return ExportProgress::Finished { files: self.files };
                }
            }
        }
        ExportProgress::Pending { files: self.files }
    }

    fn append(&mut self, entry: &DirEntry) {
        let ft = entry.file_type();
        if ft.is_dir() || (ft.is_symlink() && entry.path().is_dir()) {
            return;
        }

        let rel = relative_label(&self.root, entry.path());
        self.blob.push_str(SPLITTER);
        self.blob.push('\n');
        self.blob.push_str(&rel);
        self.blob.push('\n');
        self.blob.push_str(SPLITTER);
        self.blob.push('\n');
        self.push_content(entry.path());
        self.blob.push('\n');
        self.files += 1;
    }

    fn push_content(&mut self, path: &Path) {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if size > self.max_file_bytes {
            self.blob
                .push_str(&format!("[file too large: {} bytes]", size));
            return;
        }
        match fs::read(path) {
            Ok(bytes) if is_binary(&bytes) => self.blob.push_str(BINARY_PLACEHOLDER),
            Ok(bytes) => self.blob.push_str(&String::from_utf8_lossy(&bytes)),
            Err(e) => self.blob.push_str(&format!("[error reading file: {}]", e)),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn files(&self) -> usize {
        self.files
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drives the walk to its end and returns the output.
    pub fn finish(mut self) -> ExportOutput {
        while !self.finished {
            self.step(usize::MAX);
        }
        ExportOutput {
            root: self.root,
            preamble: self.preamble,
            blob: self.blob,
            files: self.files,
        }
    }

    /// Exports `root` in one call.
    pub fn run_to_end(
        root: &Path,
        rules: &ExportRules,
        default_preamble: &str,
    ) -> Result<ExportOutput, ExportError> {
        Ok(Self::start(root, rules, default_preamble)?.finish())
    }
}

/// Loads the preamble from the root's preamble file, or falls back to `default`.
/// The returned text always ends with a newline.
fn read_preamble(root: &Path, default: &str) -> (String, Option<PathBuf>) {
    for name in PREAMBLE_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        match fs::read(&path) {
            Ok(bytes) => {
                let mut text = String::from_utf8_lossy(&bytes).into_owned();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                return (text, Some(path));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preamble unreadable");
            }
        }
    }

    let mut text = default.to_owned();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    (text, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn frame(rel: &str, content: &str) -> String {
        format!("{SPLITTER}\n{rel}\n{SPLITTER}\n{content}\n")
    }

    #[test]
    fn splitter_is_sixty_nine_dashes() {
        assert_eq!(SPLITTER.len(), 69);
        assert!(SPLITTER.chars().all(|c| c == '-'));
    }

    #[test]
    fn export_frames_text_and_binary_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("notes.txt"), "hello")?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub/bin.dat"), [0u8, 159, 146, 150])?;

        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;

        let expected = format!(
            "{}{}{}",
            DEFAULT_PREAMBLE,
            frame("notes.txt", "hello"),
            frame("sub/bin.dat", BINARY_PLACEHOLDER)
        );
        assert_eq!(out.blob, expected);
        assert_eq!(out.files, 2);
        Ok(())
    }

    #[test]
    fn preamble_file_replaces_default() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("prepromt.txt"), "review this")?;
        fs::write(dir.path().join("a.rs"), "fn a() {}")?;

        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, DEFAULT_PREAMBLE)?;
        assert!(out.blob.starts_with("review this\n"));
        assert_eq!(out.preamble, "review this\n");
        assert!(!out.blob.contains("prepromt.txt"));
        assert_eq!(out.files, 1);
        Ok(())
    }

    #[test]
    fn default_ignores_apply() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("node_modules"))?;
        fs::write(dir.path().join("node_modules/pkg.js"), "x")?;
        fs::write(dir.path().join("cache.pyc"), "x")?;
        fs::write(dir.path().join("Thumbs.db"), "x")?;
        fs::write(dir.path().join("logo.SVG"), "<svg/>")?;
        fs::write(dir.path().join("keep.md"), "kept")?;

        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, "intro")?;
        assert_eq!(out.blob, format!("intro\n{}", frame("keep.md", "kept")));
        Ok(())
    }

    #[test]
    fn gitignore_first_match_wins() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join(".gitignore"), "!keep.gen\n*.gen\ntarget/\n")?;
        fs::write(dir.path().join("drop.gen"), "x")?;
        fs::write(dir.path().join("keep.gen"), "y")?;
        fs::create_dir(dir.path().join("target"))?;
        fs::write(dir.path().join("target/out"), "z")?;

        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, "p")?;
        assert!(out.blob.contains("\nkeep.gen\n"));
        assert!(!out.blob.contains("drop.gen"));
        assert!(!out.blob.contains("target/out"));
        Ok(())
    }

    #[test]
    fn gitignore_negation_does_not_keep_svg() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join(".gitignore"), "!logo.svg\n")?;
        fs::write(dir.path().join("logo.svg"), "<svg/>")?;
        fs::write(dir.path().join("a.txt"), "a")?;

        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, "p")?;
        assert!(out.blob.contains("\na.txt\n"));
        assert!(!out.blob.contains("\nlogo.svg\n"));
        assert!(!out.blob.contains("<svg/>"));
        Ok(())
    }

    #[test]
    fn empty_tree_says_so() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let out = ExportJob::run_to_end(dir.path(), &ExportRules::standard()?, "p\n")?;
        assert_eq!(out.blob, format!("p\n{EMPTY_EXPORT}\n"));
        assert_eq!(out.files, 0);
        Ok(())
    }

    #[test]
    fn stepping_yields_between_chunks() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for i in 0..5 {
            fs::write(dir.path().join(format!("f{i}.txt")), "x")?;
        }

        let mut job = ExportJob::start(dir.path(), &ExportRules::standard()?, "p")?;
        assert_eq!(job.step(2), ExportProgress::Pending { files: 2 });
        assert_eq!(job.step(2), ExportProgress::Pending { files: 4 });
        assert_eq!(job.step(2), ExportProgress::Finished { files: 5 });
        assert!(job.is_finished());
        Ok(())
    }

    #[test]
    fn oversized_files_get_a_marker() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("big.txt"), "0123456789")?;

        let rules = ExportRules::new::<&str>(&[], &[], &[], 4)?;
        let out = ExportJob::run_to_end(dir.path(), &rules, "p")?;
        assert!(out.blob.contains("[file too large: 10 bytes]"));
        Ok(())
    }

    #[test]
    fn non_directory_root_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("plain");
        fs::write(&file, "")?;
        assert!(matches!(
            ExportJob::start(&file, &ExportRules::standard()?, "p"),
            Err(ExportError::NotADirectory(_))
        ));
        Ok(())
    }
}
