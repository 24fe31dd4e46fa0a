//! Filesystem operations behind register commits.
//!
//! Every operation works entry by entry and reports one [OpOutcome] per source, so one missing
//! file never blocks the rest of a batch.

use crate::utils::{copy_recursive, get_unused_path, remove_path};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Done {
        source: PathBuf,
        target: Option<PathBuf>,
    },
    Failed {
        source: PathBuf,
        reason: String,
    },
}

impl OpOutcome {
    pub fn source(&self) -> &Path {
        match self {
            OpOutcome::Done { source, .. } | OpOutcome::Failed { source, .. } => source,
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, OpOutcome::Done { .. })
    }

    fn failed(source: &Path, reason: impl Into<String>) -> Self {
        OpOutcome::Failed {
            source: source.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn from_io(source: &Path, target: Option<PathBuf>, res: io::Result<()>) -> Self {
        match res {
            Ok(()) => OpOutcome::Done {
                source: source.to_path_buf(),
                target,
            },
            Err(e) => OpOutcome::failed(source, e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a whole commit: what went through and what did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub done: Vec<PathBuf>,
    pub failed: Vec<CommitFailure>,
}

impl CommitReport {
    pub fn from_outcomes(outcomes: Vec<OpOutcome>) -> Self {
        let mut report = CommitReport::default();
        for outcome in outcomes {
            match outcome {
                OpOutcome::Done { source, .. } => report.done.push(source),
                OpOutcome::Failed { source, reason } => report.failed.push(CommitFailure {
                    path: source,
                    reason,
                }),
            }
        }
        report
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.done.len() + self.failed.len()
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Status line text listing the first failures inline.
    pub fn summary(&self, verb: &str) -> String {
        if self.is_clean() {
            return format!("{} {} item(s)", verb, self.done.len());
        }
        let shown: Vec<String> = self
            .failed
            .iter()
            .take(2)
            .map(|f| {
                let name = f
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| f.path.display().to_string());
                format!("{}: {}", name, f.reason)
            })
            .collect();
        let more = self.failed.len().saturating_sub(shown.len());
        let tail = if more > 0 {
            format!(" (+{} more)", more)
        } else {
            String::new()
        };
        format!(
            "{} {}/{}; failed: {}{}",
            verb,
            self.done.len(),
            self.total(),
            shown.join(", "),
            tail
        )
    }
}

/// The filesystem seam used by registers.
pub trait FileOps {
    /// Copies every source into `dest`, renaming on collision.
    fn copy(&self, sources: &[PathBuf], dest: &Path) -> Vec<OpOutcome>;

    /// Moves every source into `dest`, renaming on collision.
    fn relocate(&self, sources: &[PathBuf], dest: &Path) -> Vec<OpOutcome>;

    /// Removes every source, to the trash when configured.
    fn remove(&self, sources: &[PathBuf]) -> Vec<OpOutcome>;
}

/// [FileOps] over `std::fs` and the `trash` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps {
    move_to_trash: bool,
}

impl StdFileOps {
    pub fn new(move_to_trash: bool) -> Self {
        Self { move_to_trash }
    }

    fn target_for(source: &Path, dest: &Path) -> Result<PathBuf, String> {
        if fs::symlink_metadata(source).is_err() {
            return Err("source missing".into());
        }
        if !dest.is_dir() {
            return Err(format!("{} is not a directory", dest.display()));
        }
        if source.is_dir() && dest.starts_with(source) {
            return Err("cannot place a directory inside itself".into());
        }
        let Some(name) = source.file_name() else {
            return Err("source has no file name".into());
        };
        Ok(get_unused_path(&dest.join(name)))
    }
}

impl FileOps for StdFileOps {
    fn copy(&self, sources: &[PathBuf], dest: &Path) -> Vec<OpOutcome> {
        sources
            .iter()
            .map(|src| match Self::target_for(src, dest) {
                Ok(target) => {
                    let res = copy_recursive(src, &target);
                    OpOutcome::from_io(src, Some(target), res)
                }
                Err(reason) => OpOutcome::failed(src, reason),
            })
            .collect()
    }

    fn relocate(&self, sources: &[PathBuf], dest: &Path) -> Vec<OpOutcome> {
        sources
            .iter()
            .map(|src| {
                if src.parent() == Some(dest) && fs::symlink_metadata(src).is_ok() {
                    return OpOutcome::Done {
                        source: src.clone(),
                        target: Some(src.clone()),
                    };
                }
                match Self::target_for(src, dest) {
                    Ok(target) => {
                        let res = fs::rename(src, &target).or_else(|_| {
                            copy_recursive(src, &target)?;
                            remove_path(src)
                        });
                        OpOutcome::from_io(src, Some(target), res)
                    }
                    Err(reason) => OpOutcome::failed(src, reason),
                }
            })
            .collect()
    }

    fn remove(&self, sources: &[PathBuf]) -> Vec<OpOutcome> {
        sources
            .iter()
            .map(|src| {
                if fs::symlink_metadata(src).is_err() {
                    return OpOutcome::failed(src, "source missing");
                }
                let res = if self.move_to_trash {
                    trash::delete(src).map_err(|e| io::Error::other(e.to_string()))
                } else {
                    remove_path(src)
                };
                OpOutcome::from_io(src, None, res)
            })
            .collect()
    }
}
