//! OS clipboard access.
//!
//! [ClipboardWriter] is the seam; [SystemClipboard] talks to the OS through `arboard`,
//! [MemoryClipboard] records calls for tests and headless sessions.

use crate::core::error::ClipboardError;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What a register will do on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterOp {
    Copy,
    Cut,
    Move,
    Export,
}

impl RegisterOp {
    pub fn label(self) -> &'static str {
        match self {
            RegisterOp::Copy => "copy",
            RegisterOp::Cut => "cut",
            RegisterOp::Move => "move",
            RegisterOp::Export => "export",
        }
    }
}

pub trait ClipboardWriter {
    /// Replaces the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Offers staged paths to other applications as text: the operation on the first line,
    /// then one path per line.
    fn stage_paths(&mut self, op: RegisterOp, paths: &[PathBuf]) -> Result<(), ClipboardError> {
        let text = std::iter::once(op.label().to_owned())
            .chain(paths.iter().map(|p| p.display().to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        self.write_text(&text)
    }
}

/// The OS clipboard. Opened lazily on first use so sessions without a display still start.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard not initialized".into()))
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.handle()?.set_text(text.to_owned())?;
        Ok(())
    }
}

/// One recorded clipboard call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardCall {
    Text(String),
    Paths(RegisterOp, Vec<PathBuf>),
}

/// In-memory clipboard. Clones share one call log.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    calls: Arc<Mutex<Vec<ClipboardCall>>>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails with [ClipboardError::Unavailable].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ClipboardCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The most recent text written with `write_text`.
    pub fn last_text(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            ClipboardCall::Text(t) => Some(t),
            ClipboardCall::Paths(..) => None,
        })
    }

    fn record(&mut self, call: ClipboardCall) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Unavailable("no clipboard".into()));
        }
        self.calls
            .lock()
            .map_err(|e| ClipboardError::Write(e.to_string()))?
            .push(call);
        Ok(())
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.record(ClipboardCall::Text(text.to_owned()))
    }

    fn stage_paths(&mut self, op: RegisterOp, paths: &[PathBuf]) -> Result<(), ClipboardError> {
        self.record(ClipboardCall::Paths(op, paths.to_vec()))
    }
}
