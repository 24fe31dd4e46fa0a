//! Application State and main controller module for fiander.
//!
//! This module defines the overall [AppState] struct, the single mutable root of a session.
//! It owns:
//! - the configuration reference and the keymap built from it
//! - the mode controller, navigation state, selection and the one live clipboard register
//! - the preview state and the preview worker channels
//! - a running catlsr export, stepped from [AppState::tick]
//! - the current layout metrics and the status line message
//!
//! Input handling lives in [crate::app::handlers], the draw model in [crate::app::view].

use crate::app::actions::{PromptKind, PromptState};
use crate::app::keymap::Keymap;
use crate::app::mode::{Mode, ModeController};
use crate::app::preview::PREVIEW_DEBOUNCE;
use crate::app::{ClipboardRegister, NavState, PreviewState, SelectionSet};
use crate::config::{Config, PreviewMethod};
use crate::core::worker::{WorkerTask, Workers};
use crate::core::{
    BatHighlighter, ClipboardWriter, ExportError, ExportJob, ExportOutput, ExportProgress,
    FileOps, Highlighter, MemoryClipboard, PlainHighlighter, StdFileOps, SystemClipboard,
    Viewport,
};
use crate::utils::shorten_home_path;

use ratatui::layout::Rect;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::{env, io};

/// How long a status message stays up.
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// Enumeration for each individual keypress result processed.
///
/// Is used by the event loop to decide whether to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypressResult {
    Continue,
    Consumed,
    Quit,
    OpenedEditor,
    Recovered,
}

/// Inner areas of the two panes, in terminal cells, as last drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub list: Rect,
    pub preview: Rect,
}

impl LayoutMetrics {
    #[inline]
    pub fn list_rows(&self) -> usize {
        self.list.height as usize
    }

    #[inline]
    pub fn preview_rows(&self) -> usize {
        self.preview.height as usize
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            list: Rect::new(1, 2, 38, 20),
            preview: Rect::new(41, 2, 58, 20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub at: Instant,
}

/// The external collaborators of a session.
pub struct Services {
    pub highlighter: Arc<dyn Highlighter>,
    pub clipboard: Box<dyn ClipboardWriter>,
    pub fileops: Box<dyn FileOps>,
}

impl Services {
    /// Production services: `bat` when configured and installed, the OS clipboard and the
    /// real filesystem.
    pub fn system(config: &Config) -> Self {
        let highlighter: Arc<dyn Highlighter> = match config.display().preview_method() {
            PreviewMethod::Bat if BatHighlighter::available() => {
                Arc::new(BatHighlighter::new(config.display().bat().args()))
            }
            PreviewMethod::Bat => {
                tracing::warn!("bat not found, using the internal preview");
                Arc::new(PlainHighlighter)
            }
            PreviewMethod::Internal => Arc::new(PlainHighlighter),
        };
        Self {
            highlighter,
            clipboard: Box::new(SystemClipboard::new()),
            fileops: Box::new(StdFileOps::new(config.general().move_to_trash())),
        }
    }

    /// Plain previews, an in-memory clipboard and permanent deletes.
    pub fn headless(clipboard: MemoryClipboard) -> Self {
        Self {
            highlighter: Arc::new(PlainHighlighter),
            clipboard: Box::new(clipboard),
            fileops: Box::new(StdFileOps::new(false)),
        }
    }
}

/// Main struct which holds the central Application state of fiander
pub struct AppState<'a> {
    pub(super) config: &'a Config,
    pub(super) keymap: Keymap,
    pub(super) modes: ModeController,

    pub(super) nav: NavState,
    pub(super) selection: SelectionSet,
    pub(super) register: Option<ClipboardRegister>,
    pub(super) preview: PreviewState,
    pub(super) prompt: Option<PromptState>,
    pub(super) export: Option<ExportJob>,

    pub(super) workers: Workers,
    pub(super) clipboard: Box<dyn ClipboardWriter>,
    pub(super) fileops: Box<dyn FileOps>,

    pub(super) metrics: LayoutMetrics,
    pub(super) status: Option<StatusMessage>,
    pub(super) show_help: bool,
    pub(super) drag_anchor: Option<usize>,
}

impl<'a> AppState<'a> {
    pub fn new(config: &'a Config) -> io::Result<Self> {
        let current_dir = env::current_dir()?;
        Self::from_dir(config, &current_dir)
    }

    pub fn from_dir(config: &'a Config, initial_path: &Path) -> io::Result<Self> {
        Self::with_services(config, initial_path, Services::system(config))
    }

    pub fn with_services(
        config: &'a Config,
        initial_path: &Path,
        services: Services,
    ) -> io::Result<Self> {
        let current_dir = if initial_path.is_dir() {
            initial_path.to_path_buf()
        } else {
            env::current_dir()?
        };

        let metrics = LayoutMetrics::default();
        let mut nav = NavState::new(
            current_dir,
            config.general().sort(),
            config.general().show_hidden(),
            config.input().history(),
        );
        nav.set_viewport(Viewport::new(
            metrics.list_rows(),
            config.display().scrolloff(),
        ));

        let mut app = Self {
            config,
            keymap: Keymap::from_config(config),
            modes: ModeController::new(Duration::from_millis(
                config.input().sequence_timeout_ms(),
            )),
            nav,
            selection: SelectionSet::new(),
            register: None,
            preview: PreviewState::default(),
            prompt: None,
            export: None,
            workers: Workers::spawn(services.highlighter),
            clipboard: services.clipboard,
            fileops: services.fileops,
            metrics,
            status: None,
            show_help: false,
            drag_anchor: None,
        };

        if let Err(e) = app.nav.reload() {
            tracing::warn!(error = %e, "initial listing failed");
            app.set_status(e.to_string(), StatusLevel::Error);
        }
        app.request_preview();
        Ok(app)
    }

    // Getters/ accessors

    #[inline]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline]
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[inline]
    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    #[inline]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[inline]
    pub fn register(&self) -> Option<&ClipboardRegister> {
        self.register.as_ref()
    }

    #[inline]
    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    #[inline]
    pub fn prompt(&self) -> Option<&PromptState> {
        self.prompt.as_ref()
    }

    #[inline]
    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    #[inline]
    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    #[inline]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    #[inline]
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Stores the pane areas of the last draw and refits the cursor window to them.
    pub fn update_layout(&mut self, metrics: LayoutMetrics) {
        if self.metrics == metrics {
            return;
        }
        self.metrics = metrics;
        self.nav.set_viewport(Viewport::new(
            metrics.list_rows(),
            self.config.display().scrolloff(),
        ));
        self.preview.scroll_by(0, metrics.preview_rows());
    }

    /// The heart of the app: advances timers, worker results and the export.
    ///
    /// Returns true when something visible changed and the frame needs a redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.modes.expire(now);

        while let Ok(response) = self.workers.response_rx().try_recv() {
            changed |= self.preview.apply(response);
        }

        if self.preview.should_trigger(now, self.preview_debounce()) {
            self.request_preview();
            changed = true;
        }

        changed |= self.step_export();

        if let Some(status) = &self.status
            && now.saturating_duration_since(status.at) >= STATUS_TTL
        {
            self.status = None;
            changed = true;
        }
        changed
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            at: Instant::now(),
        });
    }

    // Prompt

    pub(crate) fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(PromptState::new(kind));
        self.modes.set_mode(Mode::Prompt);
    }

    pub(crate) fn close_prompt(&mut self) -> Option<PromptState> {
        self.modes.to_normal();
        self.prompt.take()
    }

    // Preview requests

    fn preview_debounce(&self) -> Duration {
        if self.config.display().instant_preview() {
            Duration::ZERO
        } else {
            PREVIEW_DEBOUNCE
        }
    }

    /// Sends a preview request for the entry under the cursor, superseding any in flight.
    pub(crate) fn request_preview(&mut self) {
        if !self.config.display().preview() {
            self.preview.clear();
            return;
        }
        let Some(entry) = self.nav.selected_entry() else {
            self.preview.clear();
            return;
        };
        let path = entry.path().to_path_buf();
        let is_dir = entry.is_dir();

        let request_id = self.workers.next_generation();
        self.preview.prepare_new_request(path.clone(), request_id);

        let task = WorkerTask::LoadPreview {
            path,
            is_dir,
            max_lines: self.config.display().preview_max_lines(),
            show_hidden: self.nav.show_hidden(),
            sort: self.nav.sort(),
            request_id,
        };
        if self.workers.preview_tx().send(task).is_err() {
            tracing::warn!("preview worker is gone");
            self.preview.set_notice("Preview unavailable");
        }
    }

    /// Follow-up of every cursor motion: refreshes the visual range and, when the entry under
    /// the cursor changed, invalidates the shown preview and schedules a new one.
    pub(crate) fn cursor_moved(&mut self, now: Instant) {
        self.sync_selection();
        let target = self.nav.selected_entry().map(|e| e.path().to_path_buf());
        if target.as_deref() == self.preview.current_path() {
            return;
        }
        self.schedule_preview(target, now);
    }

    /// Like [AppState::cursor_moved], but also re-previews an unchanged entry.
    pub(crate) fn refresh_preview(&mut self, now: Instant) {
        self.sync_selection();
        let target = self.nav.selected_entry().map(|e| e.path().to_path_buf());
        self.schedule_preview(target, now);
    }

    fn schedule_preview(&mut self, target: Option<PathBuf>, now: Instant) {
        match target {
            Some(path) => {
                let request_id = self.workers.next_generation();
                self.preview.prepare_new_request(path, request_id);
                self.preview.mark_pending(now);
            }
            None => self.preview.clear(),
        }
    }

    pub(crate) fn sync_selection(&mut self) {
        if let Some(anchor) = self.modes.visual_anchor() {
            self.selection
                .select_range(self.nav.listing(), anchor, self.nav.selected_idx());
        }
    }

    // Export

    /// Starts a catlsr export of `root`. It advances a chunk per tick.
    pub(crate) fn start_export(&mut self, root: PathBuf) {
        if self.export.is_some() {
            self.set_status("An export is already running", StatusLevel::Warn);
            return;
        }
        let started = self
            .config
            .export()
            .rules()
            .and_then(|rules| ExportJob::start(&root, &rules, self.config.export().preamble()));
        match started {
            Ok(job) => {
                tracing::info!(root = %root.display(), "export started");
                self.set_status(
                    format!("Exporting {}", shorten_home_path(&root)),
                    StatusLevel::Info,
                );
                self.export = Some(job);
            }
            Err(e) => {
                tracing::warn!(error = %e, "export could not start");
                self.set_status(e.to_string(), StatusLevel::Error);
            }
        }
    }

    /// Drops a running export and its partial text. The register is left as it was.
    pub(crate) fn cancel_export(&mut self) -> bool {
        let Some(job) = self.export.take() else {
            return false;
        };
        tracing::info!(
            root = %job.root().display(),
            files = job.files(),
            "export cancelled"
        );
        self.set_status(ExportError::Cancelled.to_string(), StatusLevel::Warn);
        true
    }

    fn step_export(&mut self) -> bool {
        let chunk = self.config.export().chunk_size();
        let Some(job) = self.export.as_mut() else {
            return false;
        };
        match job.step(chunk) {
            ExportProgress::Pending { files } => {
                let root = shorten_home_path(job.root());
                self.set_status(
                    format!("Exporting {root}: {files} file(s)"),
                    StatusLevel::Info,
                );
            }
            ExportProgress::Finished { .. } => {
                if let Some(job) = self.export.take() {
                    self.finish_export(job.finish());
                }
            }
        }
        true
    }

    fn finish_export(&mut self, output: ExportOutput) {
        let files = output.files;
        let root = shorten_home_path(&output.root);
        tracing::info!(root = %output.root.display(), files, bytes = output.blob.len(), "export finished");

        let written = self.clipboard.write_text(&output.blob);
        self.preview.set_output(&output.blob);
        self.register = Some(ClipboardRegister::export(output));

        match written {
            Ok(()) => self.set_status(
                format!("Exported {files} file(s) from {root} to the clipboard"),
                StatusLevel::Info,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "export blob not copied to the clipboard");
                self.set_status(
                    format!("Exported {files} file(s) from {root}; {e}"),
                    StatusLevel::Warn,
                );
            }
        }
    }
}
