//! The clipboard register.
//!
//! One register is live at a time and it is owned by the session. It holds snapshots of the
//! staged entries (or an export blob) and is applied with [ClipboardRegister::commit] against
//! a destination. Nothing touches the filesystem before that.

use crate::core::{
    CommitError, CommitReport, ExportOutput, FileEntry, FileOps, OpOutcome, RegisterOp,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardRegister {
    op: RegisterOp,
    entries: Vec<FileEntry>,
    source_dir: PathBuf,
    preamble_template: Option<String>,
    blob: Option<String>,
    /// Cut sources already copied whose removal failed, with the copy's path.
    copied: HashMap<PathBuf, PathBuf>,
}

impl ClipboardRegister {
    fn staged(op: RegisterOp, source_dir: &Path, entries: Vec<FileEntry>) -> Self {
        Self {
            op,
            entries,
            source_dir: source_dir.to_path_buf(),
            preamble_template: None,
            blob: None,
            copied: HashMap::new(),
        }
    }

    /// `yy`: copy on commit, sources untouched.
    pub fn copy(source_dir: &Path, entries: Vec<FileEntry>) -> Self {
        Self::staged(RegisterOp::Copy, source_dir, entries)
    }

    /// `dd`: copy on commit, then remove the sources.
    pub fn cut(source_dir: &Path, entries: Vec<FileEntry>) -> Self {
        Self::staged(RegisterOp::Cut, source_dir, entries)
    }

    /// `mm`: rename into the destination on commit.
    pub fn relocate(source_dir: &Path, entries: Vec<FileEntry>) -> Self {
        Self::staged(RegisterOp::Move, source_dir, entries)
    }

    /// A finished catlsr export.
    pub fn export(output: ExportOutput) -> Self {
        Self {
            op: RegisterOp::Export,
            entries: Vec::new(),
            source_dir: output.root,
            preamble_template: Some(output.preamble),
            blob: Some(output.blob),
            copied: HashMap::new(),
        }
    }

    // Getters

    #[inline]
    pub fn op(&self) -> RegisterOp {
        self.op
    }

    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    #[inline]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn preamble(&self) -> Option<&str> {
        self.preamble_template.as_deref()
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path().to_path_buf()).collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path() == path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.blob.is_none()
    }

    /// A Cut or Move register with nothing left to apply.
    pub fn is_spent(&self) -> bool {
        matches!(self.op, RegisterOp::Cut | RegisterOp::Move) && self.entries.is_empty()
    }

    /// Status line label, e.g. `cut 3`.
    pub fn label(&self) -> String {
        match self.op {
            RegisterOp::Export => format!(
                "export {}",
                self.source_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.source_dir.display().to_string())
            ),
            op => format!("{} {}", op.label(), self.entries.len()),
        }
    }

    /// Applies the register into `dest`.
    ///
    /// Every source is re-validated by `ops`; failed entries are reported and stay in a Cut or
    /// Move register, the others go through. A Copy register stays live for another paste.
    pub fn commit(&mut self, dest: &Path, ops: &dyn FileOps) -> Result<CommitReport, CommitError> {
        if self.op == RegisterOp::Export {
            return Err(CommitError::NotCommittable);
        }
        if self.entries.is_empty() {
            return Err(CommitError::EmptyRegister);
        }

        let sources = self.paths();
        let outcomes = match self.op {
            RegisterOp::Copy => ops.copy(&sources, dest),
            RegisterOp::Move => ops.relocate(&sources, dest),
            RegisterOp::Cut => self.cut_into(&sources, dest, ops),
            RegisterOp::Export => Vec::new(),
        };
        let report = CommitReport::from_outcomes(outcomes);
        tracing::info!(
            op = self.op.label(),
            dest = %dest.display(),
            done = report.done.len(),
            failed = report.failed.len(),
            "register committed"
        );

        self.settle(&report);
        Self::finish(report)
    }

    /// Deletes the sources of a Cut register in place, without copying them anywhere.
    pub fn purge(&mut self, ops: &dyn FileOps) -> Result<CommitReport, CommitError> {
        if self.op != RegisterOp::Cut {
            return Err(CommitError::NotCommittable);
        }
        if self.entries.is_empty() {
            return Err(CommitError::EmptyRegister);
        }

        let report = CommitReport::from_outcomes(ops.remove(&self.paths()));
        tracing::info!(
            done = report.done.len(),
            failed = report.failed.len(),
            "register purged"
        );
        self.settle(&report);
        Self::finish(report)
    }

    /// Copy then remove. Sources already in `dest` stay where they are.
    ///
    /// A source whose copy from an earlier paste into `dest` still exists is not copied
    /// again; only its removal is retried.
    fn cut_into(&mut self, sources: &[PathBuf], dest: &Path, ops: &dyn FileOps) -> Vec<OpOutcome> {
        let (in_place, elsewhere): (Vec<PathBuf>, Vec<PathBuf>) = sources
            .iter()
            .cloned()
            .partition(|src| src.parent() == Some(dest));

        let mut outcomes = ops.relocate(&in_place, dest);

        let mut to_remove = Vec::with_capacity(elsewhere.len());
        let mut to_copy = Vec::with_capacity(elsewhere.len());
        for src in elsewhere {
            match self.copied.remove(&src) {
                Some(target) if target.parent() == Some(dest) && target.exists() => {
                    tracing::debug!(source = %src.display(), "already copied, retrying removal");
                    to_remove.push((src, Some(target)));
                }
                _ => to_copy.push(src),
            }
        }
        for copied in ops.copy(&to_copy, dest) {
            match copied {
                OpOutcome::Done { source, target } => to_remove.push((source, target)),
                failed => outcomes.push(failed),
            }
        }

        for (source, target) in to_remove {
            let removed = ops.remove(std::slice::from_ref(&source));
            let reason = match removed.into_iter().next() {
                Some(OpOutcome::Done { .. }) => {
                    outcomes.push(OpOutcome::Done { source, target });
                    continue;
                }
                Some(OpOutcome::Failed { reason, .. }) => {
                    format!("copied, but source not removed: {reason}")
                }
                None => "copied, but source not removed".to_owned(),
            };
            if let Some(target) = target {
                self.copied.insert(source.clone(), target);
            }
            outcomes.push(OpOutcome::Failed { source, reason });
        }
        outcomes
    }

    /// Drops the entries that went through from a Cut or Move register.
    fn settle(&mut self, report: &CommitReport) {
        if matches!(self.op, RegisterOp::Cut | RegisterOp::Move) {
            self.entries
                .retain(|e| report.failed.iter().any(|f| f.path == e.path()));
            let entries = &self.entries;
            self.copied
                .retain(|src, _| entries.iter().any(|e| e.path() == src));
        }
    }

    fn finish(report: CommitReport) -> Result<CommitReport, CommitError> {
        if report.is_clean() {
            Ok(report)
        } else {
            for failure in &report.failed {
                tracing::warn!(
                    path = %failure.path.display(),
                    reason = %failure.reason,
                    "commit entry failed"
                );
            }
            Err(CommitError::Partial(report))
        }
    }
}
