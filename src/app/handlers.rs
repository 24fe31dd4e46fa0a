//! Input action handler methods for fiander.
//!
//! This module implements [AppState] methods that process key and mouse events: the
//! prompt, the mode controller and keymap dispatch, and every navigation, register and
//! view action.

use crate::app::actions::{PromptCommand, PromptKind, PromptState};
use crate::app::keymap::{Action, NavAction, RegisterAction, SystemAction, ViewAction};
use crate::app::mode::{Focus, KeyOutcome, Mode};
use crate::app::state::{AppState, KeypressResult, StatusLevel};
use crate::app::{ClipboardRegister, LineMark, NavState};
use crate::core::viewport::WHEEL_STEP;
use crate::core::{
    CommitError, CommitReport, FileEntry, ListingError, RegisterOp, half_page, read_line_range,
};
use crate::utils::{expand_home_path, open_in_editor, shorten_home_path};

use crossterm::event::{
    KeyCode::*, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use std::path::Path;
use std::time::Instant;

/// AppState input and action handlers
impl<'a> AppState<'a> {
    // Entry points

    /// Central key handler.
    pub fn handle_keypress(&mut self, key: KeyEvent) -> KeypressResult {
        self.handle_keypress_at(key, Instant::now())
    }

    /// [AppState::handle_keypress] against an explicit clock.
    pub fn handle_keypress_at(&mut self, key: KeyEvent, now: Instant) -> KeypressResult {
        if self.prompt.is_some() {
            return self.handle_prompt_key(key, now);
        }

        if self.show_help {
            self.show_help = false;
            return KeypressResult::Consumed;
        }

        if key.code == Esc && !self.modes.is_pending() {
            return self.handle_esc();
        }

        match self.modes.feed(&key, &self.keymap, now) {
            KeyOutcome::Started | KeyOutcome::Abandoned => return KeypressResult::Consumed,
            KeyOutcome::Fired(action) => return self.dispatch(action, now),
            KeyOutcome::NotSequence => {}
        }

        match self.keymap.lookup(key) {
            Some(action) => self.dispatch(action, now),
            None => KeypressResult::Continue,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> KeypressResult {
        self.handle_mouse_at(mouse, Instant::now())
    }

    /// Click, drag and wheel handling against the pane areas of the last draw.
    pub fn handle_mouse_at(&mut self, mouse: MouseEvent, now: Instant) -> KeypressResult {
        if self.prompt.is_some() {
            return KeypressResult::Continue;
        }
        let pos = Position::new(mouse.column, mouse.row);
        let list = self.metrics.list;
        let in_list = list.contains(pos);
        let in_preview = self.metrics.preview.contains(pos);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if in_list => {
                self.show_help = false;
                if self.modes.mode() != Mode::Normal {
                    self.modes.to_normal();
                }
                self.drag_anchor = None;
                self.selection.clear();
                self.preview.cancel_line_mark();
                let row = (mouse.row - list.y) as usize;
                if let Some(idx) = self.nav.index_at_row(row) {
                    self.nav.move_to(idx);
                    self.drag_anchor = Some(idx);
                    self.cursor_moved(now);
                }
                KeypressResult::Consumed
            }
            MouseEventKind::Down(MouseButton::Left) if in_preview => {
                self.drag_anchor = None;
                if self.modes.focus() == Focus::List {
                    self.modes.set_mode(Mode::PreviewScroll);
                }
                let line = self.preview.scroll() + (mouse.row - self.metrics.preview.y) as usize;
                self.preview
                    .set_line_mark_cursor(line, self.metrics.preview_rows());
                KeypressResult::Consumed
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(anchor) = self.drag_anchor else {
                    return KeypressResult::Continue;
                };
                self.drag_to_row(mouse.row, list);
                if self.modes.visual_anchor() != Some(anchor) {
                    self.modes.enter_visual(anchor);
                }
                self.cursor_moved(now);
                KeypressResult::Consumed
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_anchor = None;
                KeypressResult::Continue
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let step = WHEEL_STEP as isize;
                let delta = if mouse.kind == MouseEventKind::ScrollUp {
                    -step
                } else {
                    step
                };
                if in_preview {
                    self.preview.scroll_by(delta, self.metrics.preview_rows());
                } else if in_list {
                    self.nav.scroll_by(delta);
                    self.cursor_moved(now);
                } else {
                    return KeypressResult::Continue;
                }
                KeypressResult::Consumed
            }
            _ => KeypressResult::Continue,
        }
    }

    /// Dragging past the top or bottom edge of the list scrolls it a row at a time.
    fn drag_to_row(&mut self, row: u16, list: Rect) {
        if row < list.y {
            self.nav.move_by(-1);
        } else if row >= list.bottom() {
            self.nav.move_by(1);
        } else if let Some(idx) = self.nav.index_at_row((row - list.y) as usize) {
            self.nav.move_to(idx);
        } else {
            self.nav.go_to_bottom();
        }
    }

    fn handle_esc(&mut self) -> KeypressResult {
        if self.cancel_export() {
            return KeypressResult::Consumed;
        }
        if self.preview.cancel_line_mark() {
            self.set_status("Selection cancelled", StatusLevel::Info);
            return KeypressResult::Consumed;
        }
        match self.modes.mode() {
            Mode::Visual { .. } | Mode::PreviewScroll => {
                self.modes.to_normal();
                KeypressResult::Consumed
            }
            _ if !self.selection.is_empty() => {
                self.selection.clear();
                KeypressResult::Consumed
            }
            _ if self.preview.showing_output() => {
                self.preview.hide_output();
                KeypressResult::Consumed
            }
            _ => KeypressResult::Continue,
        }
    }

    fn dispatch(&mut self, action: Action, now: Instant) -> KeypressResult {
        match action {
            Action::Nav(nav_act) => self.handle_nav_action(nav_act, now),
            Action::Register(reg_act) => self.handle_register_action(reg_act, now),
            Action::View(view_act) => self.handle_view_action(view_act, now),
            Action::System(sys_act) => self.handle_sys_action(sys_act),
        }
    }

    // Prompt input

    fn handle_prompt_key(&mut self, key: KeyEvent, now: Instant) -> KeypressResult {
        let Some(prompt) = self.prompt.as_mut() else {
            return KeypressResult::Continue;
        };

        match key.code {
            Enter => {
                if let Some(prompt) = self.close_prompt() {
                    return self.submit_prompt(prompt, now);
                }
            }
            Esc => {
                self.close_prompt();
            }
            Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_prompt();
            }
            Backspace if prompt.buffer().is_empty() => {
                self.close_prompt();
            }
            Backspace => prompt.backspace(),
            Left => prompt.move_left(),
            Right => prompt.move_right(),
            Home => prompt.home(),
            End => prompt.end(),
            Char(c) => prompt.insert(c),
            _ => return KeypressResult::Continue,
        }
        KeypressResult::Consumed
    }

    fn submit_prompt(&mut self, prompt: PromptState, now: Instant) -> KeypressResult {
        match prompt.kind() {
            PromptKind::ConfirmPurge { .. } if prompt.confirmed() => self.purge_register(now),
            PromptKind::ConfirmPurge { .. } => {
                self.set_status("Purge cancelled", StatusLevel::Info);
                KeypressResult::Consumed
            }
            PromptKind::Command => match PromptCommand::parse(prompt.buffer()) {
                Some(cmd) => self.run_command(cmd, now),
                None => KeypressResult::Consumed,
            },
        }
    }

    fn run_command(&mut self, cmd: PromptCommand, now: Instant) -> KeypressResult {
        tracing::debug!(?cmd, "prompt command");
        match cmd {
            PromptCommand::Catlsr => {
                let root = self.nav.current_dir().to_path_buf();
                self.start_export(root);
            }
            PromptCommand::Cd(arg) => self.change_dir(&arg, now),
            PromptCommand::Reload => self.reload_listing(now),
            PromptCommand::Clear => self.clear_register(),
            PromptCommand::Help => self.show_help = true,
            PromptCommand::Quit => return KeypressResult::Quit,
            PromptCommand::Unknown(name) => {
                self.set_status(format!("Unknown: {name}"), StatusLevel::Warn);
            }
        }
        KeypressResult::Consumed
    }

    fn change_dir(&mut self, arg: &str, now: Instant) {
        let target = expand_home_path(arg, self.nav.current_dir());
        match target.canonicalize() {
            Ok(path) if path.is_dir() => {
                let result = self.nav.enter(&path);
                self.after_dir_change(result, now);
            }
            Ok(path) => self.set_status(
                format!("cd: not a directory: {}", shorten_home_path(&path)),
                StatusLevel::Error,
            ),
            Err(e) => self.set_status(
                format!("cd: {}: {e}", shorten_home_path(&target)),
                StatusLevel::Error,
            ),
        }
    }

    // Navigation actions

    fn handle_nav_action(&mut self, action: NavAction, now: Instant) -> KeypressResult {
        if self.modes.focus() == Focus::Preview && self.scroll_preview(action) {
            return KeypressResult::Consumed;
        }

        match action {
            NavAction::GoUp => self.nav.move_by(-1),
            NavAction::GoDown => self.nav.move_by(1),
            NavAction::GoToTop => self.nav.go_to_top(),
            NavAction::GoToBottom => self.nav.go_to_bottom(),
            NavAction::HalfPageUp => self.nav.half_page_up(),
            NavAction::HalfPageDown => self.nav.half_page_down(),
            NavAction::PageUp => self.nav.page_up(),
            NavAction::PageDown => self.nav.page_down(),
            NavAction::GoParent => return self.go_parent(now),
            NavAction::GoIntoDir => return self.go_into_selected(now),
            NavAction::Back => return self.go_back(now),
            NavAction::Reload => {
                self.reload_listing(now);
                return KeypressResult::Consumed;
            }
        }
        self.cursor_moved(now);
        KeypressResult::Consumed
    }

    /// Scroll keys while the preview has focus. With a line mark they move its cursor.
    /// Returns false for keys the preview ignores.
    fn scroll_preview(&mut self, action: NavAction) -> bool {
        let rows = self.metrics.preview_rows();
        let half = half_page(rows) as isize;
        let page = rows.max(1) as isize;
        let delta = match action {
            NavAction::GoUp => -1,
            NavAction::GoDown => 1,
            NavAction::HalfPageUp => -half,
            NavAction::HalfPageDown => half,
            NavAction::PageUp => -page,
            NavAction::PageDown => page,
            NavAction::GoToTop => isize::MIN,
            NavAction::GoToBottom => isize::MAX,
            _ => return false,
        };
        if self.preview.line_mark().is_some() {
            self.preview.move_line_mark(delta, rows);
        } else {
            self.preview.scroll_by(delta, rows);
        }
        true
    }

    /// `v` in the preview: the first press marks a line, the second copies the marked lines.
    fn toggle_line_mark(&mut self) {
        if let Some(mark) = self.preview.take_line_mark() {
            self.copy_marked_lines(mark);
        } else if self.preview.start_line_mark() {
            self.set_status("Marking lines: v copies, Esc cancels", StatusLevel::Info);
        } else {
            self.set_status("Visual mode only for text previews", StatusLevel::Warn);
        }
    }

    fn copy_marked_lines(&mut self, mark: LineMark) {
        let text = match self.preview.output_lines(mark.range()) {
            Some(text) => Ok(text),
            None => match self.preview.current_path() {
                Some(path) => read_line_range(path, mark.range()).map_err(|e| e.to_string()),
                None => Err("nothing to copy".to_owned()),
            },
        };
        let written = text.and_then(|text| {
            self.clipboard
                .write_text(&text)
                .map_err(|e| e.to_string())
        });
        match written {
            Ok(()) => self.set_status(
                format!("Copied {} line(s) to the clipboard", mark.line_count()),
                StatusLevel::Info,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "marked lines not copied");
                self.set_status(format!("Copy failed: {e}"), StatusLevel::Error);
            }
        }
    }

    fn go_parent(&mut self, now: Instant) -> KeypressResult {
        match self.nav.leave() {
            Ok(false) => KeypressResult::Continue,
            Ok(true) => {
                self.after_dir_change(Ok(()), now);
                KeypressResult::Consumed
            }
            Err(e) => {
                self.after_dir_change(Err(e), now);
                KeypressResult::Consumed
            }
        }
    }

    fn go_back(&mut self, now: Instant) -> KeypressResult {
        match self.nav.back() {
            Ok(false) => KeypressResult::Continue,
            Ok(true) => {
                self.after_dir_change(Ok(()), now);
                KeypressResult::Consumed
            }
            Err(e) => {
                self.after_dir_change(Err(e), now);
                KeypressResult::Consumed
            }
        }
    }

    fn go_into_selected(&mut self, now: Instant) -> KeypressResult {
        let Some(entry) = self.nav.selected_entry() else {
            return KeypressResult::Continue;
        };
        let path = entry.path().to_path_buf();
        if entry.is_dir() {
            let result = self.nav.enter(&path);
            self.after_dir_change(result, now);
            return KeypressResult::Consumed;
        }
        self.open_file(&path, now)
    }

    fn open_file(&mut self, path: &Path, now: Instant) -> KeypressResult {
        tracing::info!(path = %path.display(), "opening in editor");
        if let Err(e) = open_in_editor(self.config.editor(), path) {
            tracing::warn!(error = %e, "editor failed");
            self.set_status(format!("Editor: {e}"), StatusLevel::Error);
        }
        self.reload_listing(now);
        KeypressResult::OpenedEditor
    }

    fn after_dir_change(&mut self, result: Result<(), ListingError>, now: Instant) {
        self.selection.retain_dir(self.nav.current_dir());
        if self.modes.visual_anchor().is_some() {
            self.modes.to_normal();
        }
        self.preview.hide_output();
        match result {
            Ok(()) => tracing::debug!(dir = %self.nav.current_dir().display(), "entered"),
            Err(e) => {
                tracing::warn!(error = %e, "listing failed");
                self.set_status(e.to_string(), StatusLevel::Error);
            }
        }
        self.refresh_preview(now);
    }

    pub(crate) fn reload_listing(&mut self, now: Instant) {
        if let Err(e) = self.relist(NavState::reload) {
            tracing::warn!(error = %e, "reload failed");
            self.set_status(e.to_string(), StatusLevel::Error);
        }
        self.selection.retain_dir(self.nav.current_dir());
        self.refresh_preview(now);
    }

    /// Applies a listing change in place and moves the visual anchor to the row its entry
    /// landed on. Visual ends when the anchor entry is gone.
    fn relist<R>(&mut self, change: impl FnOnce(&mut NavState) -> R) -> R {
        let anchor = self
            .modes
            .visual_anchor()
            .and_then(|idx| self.nav.entries().get(idx))
            .map(|e| e.path().to_path_buf());
        let result = change(&mut self.nav);
        if let Some(path) = anchor {
            match self.nav.listing().position_of(&path) {
                Some(idx) => self.modes.enter_visual(idx),
                None => {
                    self.modes.to_normal();
                    self.selection.clear();
                }
            }
        }
        result
    }

    // Register actions

    fn handle_register_action(&mut self, action: RegisterAction, now: Instant) -> KeypressResult {
        match action {
            RegisterAction::StageCopy => self.stage(RegisterOp::Copy),
            RegisterAction::StageCut => self.stage(RegisterOp::Cut),
            RegisterAction::StageMove => self.stage(RegisterOp::Move),
            RegisterAction::Paste => self.paste(now),
            RegisterAction::Purge => self.request_purge(),
            RegisterAction::Export => {
                let root = match self.nav.selected_entry() {
                    Some(entry) if entry.is_dir() => entry.path().to_path_buf(),
                    _ => self.nav.current_dir().to_path_buf(),
                };
                self.start_export(root);
            }
            RegisterAction::ClearRegister => self.clear_register(),
        }
        KeypressResult::Consumed
    }

    /// The selection if there is one in this directory, else the entry under the cursor.
    fn stage_targets(&self) -> Vec<FileEntry> {
        if !self.selection.is_empty() && self.selection.dir() == Some(self.nav.current_dir()) {
            return self
                .nav
                .entries()
                .iter()
                .filter(|e| self.selection.contains(e.path()))
                .cloned()
                .collect();
        }
        self.nav.selected_entry().cloned().into_iter().collect()
    }

    fn stage(&mut self, op: RegisterOp) {
        let entries = self.stage_targets();
        if entries.is_empty() {
            self.set_status("Nothing to stage", StatusLevel::Warn);
            return;
        }
        let dir = self.nav.current_dir();
        let register = match op {
            RegisterOp::Copy => ClipboardRegister::copy(dir, entries),
            RegisterOp::Cut => ClipboardRegister::cut(dir, entries),
            RegisterOp::Move => ClipboardRegister::relocate(dir, entries),
            RegisterOp::Export => return,
        };

        if let Err(e) = self.clipboard.stage_paths(op, &register.paths()) {
            tracing::warn!(error = %e, "staged paths not offered to the clipboard");
        }
        tracing::info!(op = op.label(), count = register.len(), "register staged");
        self.set_status(format!("Staged: {}", register.label()), StatusLevel::Info);
        self.register = Some(register);

        self.selection.clear();
        if self.modes.visual_anchor().is_some() {
            self.modes.to_normal();
        }
    }

    fn paste(&mut self, now: Instant) {
        let dest = self.nav.current_dir().to_path_buf();
        let Some(register) = self.register.as_mut() else {
            self.set_status("Register is empty", StatusLevel::Warn);
            return;
        };
        let verb = match register.op() {
            RegisterOp::Copy => "Copied",
            RegisterOp::Cut | RegisterOp::Move => "Moved",
            RegisterOp::Export => "Pasted",
        };
        let result = register.commit(&dest, self.fileops.as_ref());
        let spent = register.is_spent();

        self.report_commit(result, verb);
        if spent {
            self.register = None;
        }
        self.reload_listing(now);
    }

    fn request_purge(&mut self) {
        match &self.register {
            Some(reg) if reg.op() == RegisterOp::Cut && !reg.is_spent() => {
                let count = reg.len();
                self.open_prompt(PromptKind::ConfirmPurge { count });
            }
            _ => self.set_status("Purge needs a cut register (dd)", StatusLevel::Warn),
        }
    }

    fn purge_register(&mut self, now: Instant) -> KeypressResult {
        let Some(register) = self.register.as_mut() else {
            return KeypressResult::Consumed;
        };
        let result = register.purge(self.fileops.as_ref());
        let spent = register.is_spent();

        self.report_commit(result, "Deleted");
        if spent {
            self.register = None;
        }
        self.reload_listing(now);
        KeypressResult::Consumed
    }

    fn report_commit(&mut self, result: Result<CommitReport, CommitError>, verb: &str) {
        match result {
            Ok(report) => self.set_status(report.summary(verb), StatusLevel::Info),
            Err(CommitError::Partial(report)) => {
                self.set_status(report.summary(verb), StatusLevel::Error)
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Warn),
        }
    }

    fn clear_register(&mut self) {
        if self.register.take().is_some() {
            tracing::debug!("register cleared");
            self.set_status("Register cleared", StatusLevel::Info);
        }
    }

    // View actions

    fn handle_view_action(&mut self, action: ViewAction, now: Instant) -> KeypressResult {
        match action {
            ViewAction::Visual if self.modes.focus() == Focus::Preview => self.toggle_line_mark(),
            ViewAction::Visual => {
                if self.modes.visual_anchor().is_some() {
                    self.modes.to_normal();
                } else if !self.nav.entries().is_empty() {
                    self.modes.enter_visual(self.nav.selected_idx());
                    self.sync_selection();
                }
            }
            ViewAction::ToggleHidden => {
                let show = !self.nav.show_hidden();
                match self.relist(|nav| nav.set_show_hidden(show)) {
                    Ok(()) => {
                        let label = if show { "shown" } else { "hidden" };
                        self.set_status(format!("Hidden files {label}"), StatusLevel::Info);
                    }
                    Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
                }
                self.cursor_moved(now);
            }
            ViewAction::CycleSort => {
                let sort = self.nav.sort();
                self.relist(|nav| nav.resort(sort.with_key(sort.key.next())));
                self.set_status(format!("Sort: {}", self.nav.sort().label()), StatusLevel::Info);
                self.cursor_moved(now);
            }
            ViewAction::ReverseSort => {
                let sort = self.nav.sort().reversed();
                self.relist(|nav| nav.resort(sort));
                self.set_status(format!("Sort: {}", self.nav.sort().label()), StatusLevel::Info);
                self.cursor_moved(now);
            }
            ViewAction::ToggleOutput => {
                if !self.preview.toggle_output() {
                    self.set_status("No output yet", StatusLevel::Warn);
                }
            }
            ViewAction::ToggleFocus => {
                self.preview.cancel_line_mark();
                self.modes.toggle_focus();
            }
        }
        KeypressResult::Consumed
    }

    fn handle_sys_action(&mut self, action: SystemAction) -> KeypressResult {
        match action {
            SystemAction::Prompt => self.open_prompt(PromptKind::Command),
            SystemAction::KeyBindHelp => self.show_help = true,
            SystemAction::Quit => return KeypressResult::Quit,
        }
        KeypressResult::Consumed
    }
}

#[cfg(test)]
mod tests {
    use crate::app::mode::Mode;
    use crate::app::state::{AppState, KeypressResult, Services};
    use crate::config::Config;
    use crate::core::{MemoryClipboard, RegisterOp};

    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn app_at<'a>(config: &'a Config, path: &Path) -> std::io::Result<AppState<'a>> {
        AppState::with_services(config, path, Services::headless(MemoryClipboard::new()))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn fixture(names: &[&str]) -> Result<tempfile::TempDir, Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for name in names {
            fs::write(dir.path().join(name), name.as_bytes())?;
        }
        Ok(dir)
    }

    #[test]
    fn unbound_key_continues() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = tempdir()?;
        let mut app = app_at(&config, temp.path())?;
        let result = app.handle_keypress(KeyEvent::new(KeyCode::Null, KeyModifiers::NONE));
        assert_eq!(result, KeypressResult::Continue);
        Ok(())
    }

    #[test]
    fn dd_stages_a_cut_without_touching_files() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a.txt", "b.txt"])?;
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();

        app.handle_keypress_at(key('j'), now);
        app.handle_keypress_at(key('d'), now);
        assert!(app.modes().is_pending());
        app.handle_keypress_at(key('d'), now);

        let register = app.register().ok_or("no register")?;
        assert_eq!(register.op(), RegisterOp::Cut);
        assert_eq!(register.paths(), vec![temp.path().join("b.txt")]);
        assert!(temp.path().join("b.txt").exists());
        assert_eq!(app.mode(), Mode::Normal);
        Ok(())
    }

    #[test]
    fn sequence_timeout_acts_on_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a.txt"])?;
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();

        app.handle_keypress_at(key('y'), now);
        app.handle_keypress_at(key('y'), now + Duration::from_secs(2));
        assert!(app.register().is_none());
        // the late key opened a fresh sequence
        assert!(app.modes().is_pending());
        Ok(())
    }

    #[test]
    fn visual_yank_takes_the_range_and_leaves_visual() -> Result<(), Box<dyn std::error::Error>>
    {
        let config = Config::default();
        let temp = fixture(&["a", "b", "c", "d"])?;
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();

        app.handle_keypress_at(key('j'), now);
        app.handle_keypress_at(key('v'), now);
        app.handle_keypress_at(key('j'), now);
        app.handle_keypress_at(key('j'), now);
        assert_eq!(app.selection().len(), 3);

        app.handle_keypress_at(key('y'), now);
        app.handle_keypress_at(key('y'), now);

        let register = app.register().ok_or("no register")?;
        assert_eq!(register.op(), RegisterOp::Copy);
        assert_eq!(register.len(), 3);
        assert_eq!(app.mode(), Mode::Normal);
        assert!(app.selection().is_empty());
        Ok(())
    }

    #[test]
    fn unknown_prompt_command_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = tempdir()?;
        let mut app = app_at(&config, temp.path())?;

        app.handle_keypress(key(':'));
        assert_eq!(app.mode(), Mode::Prompt);
        for c in "frob".chars() {
            app.handle_keypress(key(c));
        }
        app.handle_keypress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.status().map(|s| s.text.as_str()), Some("Unknown: frob"));
        Ok(())
    }

    #[test]
    fn cd_prompt_changes_directory() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = tempdir()?;
        fs::create_dir(temp.path().join("sub"))?;
        let mut app = app_at(&config, temp.path())?;

        app.handle_keypress(key(':'));
        for c in "cd sub".chars() {
            app.handle_keypress(key(c));
        }
        app.handle_keypress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.nav().current_dir(), temp.path().canonicalize()?.join("sub"));
        Ok(())
    }

    #[test]
    fn purge_asks_first() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a.txt"])?;
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();

        app.handle_keypress_at(key('d'), now);
        app.handle_keypress_at(key('d'), now);
        app.handle_keypress_at(key('D'), now);
        assert_eq!(app.mode(), Mode::Prompt);

        app.handle_keypress_at(key('n'), now);
        app.handle_keypress_at(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), now);
        assert!(temp.path().join("a.txt").exists());

        app.handle_keypress_at(key('D'), now);
        app.handle_keypress_at(key('y'), now);
        app.handle_keypress_at(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), now);
        assert!(!temp.path().join("a.txt").exists());
        assert!(app.register().is_none());
        Ok(())
    }

    #[test]
    fn tab_routes_half_page_to_preview() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a", "b", "c"])?;
        let mut app = app_at(&config, temp.path())?;

        app.handle_keypress(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.mode(), Mode::PreviewScroll);
        app.handle_keypress(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.nav().selected_idx(), 0);

        app.handle_keypress(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.mode(), Mode::Normal);
        app.handle_keypress(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.nav().selected_idx(), 2);
        Ok(())
    }

    #[test]
    fn resort_keeps_the_visual_range_on_its_entries() -> Result<(), Box<dyn std::error::Error>>
    {
        let config = Config::default();
        let temp = tempdir()?;
        for (name, len) in [("a", 8), ("b", 1), ("c", 4), ("d", 2)] {
            fs::write(temp.path().join(name), vec![b'x'; len])?;
        }
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();

        app.handle_keypress_at(key('v'), now);
        app.handle_keypress_at(key('j'), now);
        assert_eq!(app.selection().len(), 2);

        for _ in 0..3 {
            app.handle_keypress_at(key('s'), now);
            let a = app.nav().listing().position_of(&temp.path().join("a"));
            let anchor = app.modes().visual_anchor();
            assert_eq!(anchor, a);
            assert!(app.selection().contains(&temp.path().join("a")));
            assert!(app.selection().contains(&temp.path().join("b")));
            let lo = anchor.unwrap_or(0).min(app.nav().selected_idx());
            let hi = anchor.unwrap_or(0).max(app.nav().selected_idx());
            assert_eq!(app.selection().len(), hi - lo + 1);
            assert_eq!(
                app.nav().selected_entry().map(|e| e.path().to_path_buf()),
                Some(temp.path().join("b"))
            );
        }
        Ok(())
    }

    #[test]
    fn hiding_the_anchor_leaves_visual() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&[".env", "a", "b"])?;
        let mut app = app_at(&config, temp.path())?;
        let now = Instant::now();
        assert!(app.nav().show_hidden());

        app.handle_keypress_at(key('v'), now);
        app.handle_keypress_at(key('j'), now);
        assert_eq!(app.selection().len(), 2);
        app.handle_keypress_at(key('.'), now);

        assert_eq!(app.mode(), Mode::Normal);
        assert!(app.selection().is_empty());
        Ok(())
    }

    #[test]
    fn drag_enters_visual_and_click_leaves_it() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a", "b", "c", "d", "e"])?;
        let mut app = app_at(&config, temp.path())?;
        let list = app.metrics().list;
        let now = Instant::now();

        let down = MouseEventKind::Down(MouseButton::Left);
        let drag = MouseEventKind::Drag(MouseButton::Left);
        app.handle_mouse_at(mouse(down, list.x + 2, list.y + 1), now);
        assert_eq!(app.nav().selected_idx(), 1);
        assert_eq!(app.mode(), Mode::Normal);

        app.handle_mouse_at(mouse(drag, list.x + 2, list.y + 3), now);
        assert_eq!(app.mode(), Mode::Visual { anchor: 1 });
        assert_eq!(app.nav().selected_idx(), 3);
        assert_eq!(app.selection().len(), 3);
        app.handle_mouse_at(mouse(MouseEventKind::Up(MouseButton::Left), list.x, list.y + 3), now);

        app.handle_mouse_at(mouse(down, list.x + 2, list.y), now);
        assert_eq!(app.mode(), Mode::Normal);
        assert!(app.selection().is_empty());
        assert_eq!(app.nav().selected_idx(), 0);
        Ok(())
    }

    #[test]
    fn drag_past_the_list_edge_moves_a_row() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a", "b", "c", "d"])?;
        let mut app = app_at(&config, temp.path())?;
        let list = app.metrics().list;
        let now = Instant::now();

        app.handle_mouse_at(mouse(MouseEventKind::Down(MouseButton::Left), list.x, list.y + 2), now);
        app.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), list.x, list.y - 1), now);
        assert_eq!(app.nav().selected_idx(), 1);
        assert_eq!(app.mode(), Mode::Visual { anchor: 2 });
        assert_eq!(app.selection().len(), 2);

        // rows below the last entry pin the cursor to the bottom
        app.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), list.x, list.y + 10), now);
        assert_eq!(app.nav().selected_idx(), 3);
        Ok(())
    }

    #[test]
    fn drag_without_a_press_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a", "b"])?;
        let mut app = app_at(&config, temp.path())?;
        let list = app.metrics().list;
        let result =
            app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), list.x, list.y + 1));
        assert_eq!(result, KeypressResult::Continue);
        assert_eq!(app.mode(), Mode::Normal);
        Ok(())
    }

    #[test]
    fn wheel_scrolls_the_pane_under_the_pointer() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = tempdir()?;
        for i in 0..40 {
            fs::write(temp.path().join(format!("f{i:02}")), "")?;
        }
        let mut app = app_at(&config, temp.path())?;
        let metrics = app.metrics();
        let now = Instant::now();

        app.handle_mouse_at(
            mouse(MouseEventKind::ScrollDown, metrics.preview.x, metrics.preview.y),
            now,
        );
        assert_eq!(app.nav().cursor().top(), 0);
        assert_eq!(app.nav().selected_idx(), 0);

        app.handle_mouse_at(mouse(MouseEventKind::ScrollDown, metrics.list.x, metrics.list.y), now);
        assert_eq!(app.nav().cursor().top(), 3);
        assert!(app.nav().selected_idx() >= 3);

        app.handle_mouse_at(mouse(MouseEventKind::ScrollUp, metrics.list.x, metrics.list.y), now);
        assert_eq!(app.nav().cursor().top(), 0);
        Ok(())
    }

    #[test]
    fn click_in_preview_focuses_it() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a", "b"])?;
        let mut app = app_at(&config, temp.path())?;
        let preview = app.metrics().preview;

        let result = app.handle_mouse(mouse(
            MouseEventKind::Down(MouseButton::Left),
            preview.x + 1,
            preview.y + 1,
        ));
        assert_eq!(result, KeypressResult::Consumed);
        assert_eq!(app.mode(), Mode::PreviewScroll);
        // keys now scroll the preview instead of moving the cursor
        app.handle_keypress(key('j'));
        assert_eq!(app.nav().selected_idx(), 0);
        Ok(())
    }

    #[test]
    fn preview_visual_needs_text() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let temp = fixture(&["a"])?;
        let mut app = app_at(&config, temp.path())?;

        app.handle_keypress(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        app.handle_keypress(key('v'));
        // nothing loaded yet, so no mark and no list visual either
        assert!(app.preview().line_mark().is_none());
        assert_eq!(app.mode(), Mode::PreviewScroll);
        assert_eq!(
            app.status().map(|s| s.text.as_str()),
            Some("Visual mode only for text previews")
        );
        Ok(())
    }
}
