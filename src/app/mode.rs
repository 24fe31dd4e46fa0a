//! The modal input state machine of fiander.
//!
//! [Mode] is a tagged enum: the pending key of a two key sequence and the instant it was
//! pressed live inside [Mode::Command], so there is no separate "waiting" flag to get stuck.
//! [ModeController::feed] decides whether a key belongs to a sequence; everything else is
//! dispatched through the keymap by the caller.

use crate::app::keymap::{Action, Keymap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// The mode a pending sequence returns to once it fires or is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMode {
    Normal,
    Visual { anchor: usize },
    PreviewScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Line selection from `anchor` to the cursor.
    Visual {
        anchor: usize,
    },
    /// First key of a sequence pressed, waiting for the second.
    Command {
        pending: char,
        since: Instant,
        from: BaseMode,
    },
    /// Scroll keys act on the preview pane.
    PreviewScroll,
    /// The `:` command line or a confirmation prompt owns the keyboard.
    Prompt,
}

impl From<BaseMode> for Mode {
    fn from(base: BaseMode) -> Self {
        match base {
            BaseMode::Normal => Mode::Normal,
            BaseMode::Visual { anchor } => Mode::Visual { anchor },
            BaseMode::PreviewScroll => Mode::PreviewScroll,
        }
    }
}

/// Which pane scroll keys are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Preview,
}

/// What feeding a key to the sequence recognizer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key is not part of a sequence; dispatch it normally.
    NotSequence,
    /// The key opened a sequence.
    Started,
    /// The key completed a sequence bound to this action.
    Fired(Action),
    /// The key did not complete the pending sequence. It is discarded.
    Abandoned,
}

#[derive(Debug)]
pub struct ModeController {
    mode: Mode,
    timeout: Duration,
}

impl ModeController {
    pub fn new(timeout: Duration) -> Self {
        Self {
            mode: Mode::Normal,
            timeout,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        match self.base() {
            Some(BaseMode::PreviewScroll) => Focus::Preview,
            _ => Focus::List,
        }
    }

    /// The non-transient mode underneath a pending sequence.
    pub fn base(&self) -> Option<BaseMode> {
        match self.mode {
            Mode::Normal => Some(BaseMode::Normal),
            Mode::Visual { anchor } => Some(BaseMode::Visual { anchor }),
            Mode::PreviewScroll => Some(BaseMode::PreviewScroll),
            Mode::Command { from, .. } => Some(from),
            Mode::Prompt => None,
        }
    }

    pub fn visual_anchor(&self) -> Option<usize> {
        match self.base() {
            Some(BaseMode::Visual { anchor }) => Some(anchor),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.mode, Mode::Command { .. })
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, "mode change");
        }
        self.mode = mode;
    }

    pub fn enter_visual(&mut self, anchor: usize) {
        self.set_mode(Mode::Visual { anchor });
    }

    pub fn to_normal(&mut self) {
        self.set_mode(Mode::Normal);
    }

    pub fn toggle_focus(&mut self) {
        match self.focus() {
            Focus::List => self.set_mode(Mode::PreviewScroll),
            Focus::Preview => self.set_mode(Mode::Normal),
        }
    }

    /// Drops a pending sequence whose timeout elapsed. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if let Mode::Command {
            pending,
            since,
            from,
        } = self.mode
            && now.saturating_duration_since(since) >= self.timeout
        {
            tracing::trace!(%pending, "key sequence timed out");
            self.mode = from.into();
            return true;
        }
        false
    }

    /// Runs `key` through the sequence recognizer.
    pub fn feed(&mut self, key: &KeyEvent, keymap: &Keymap, now: Instant) -> KeyOutcome {
        if self.mode == Mode::Prompt {
            return KeyOutcome::NotSequence;
        }
        self.expire(now);

        let plain = plain_char(key);

        if let Mode::Command { pending, from, .. } = self.mode {
            self.mode = from.into();
            return match plain.and_then(|c| keymap.sequence(pending, c)) {
                Some(action) => KeyOutcome::Fired(action),
                None => {
                    tracing::trace!(%pending, key = ?key.code, "key sequence abandoned");
                    KeyOutcome::Abandoned
                }
            };
        }

        match (plain, self.base()) {
            (Some(c), Some(from)) if keymap.starts_sequence(c) => {
                self.mode = Mode::Command {
                    pending: c,
                    since: now,
                    from,
                };
                KeyOutcome::Started
            }
            _ => KeyOutcome::NotSequence,
        }
    }

    /// Short label of the mode for the status line.
    pub fn label(&self) -> String {
        match self.mode {
            Mode::Normal => "NORMAL".into(),
            Mode::Visual { .. } => "VISUAL".into(),
            Mode::Command { pending, .. } => format!("{pending}-"),
            Mode::PreviewScroll => "PREVIEW".into(),
            Mode::Prompt => "PROMPT".into(),
        }
    }
}

/// A character key without Ctrl or Alt.
fn plain_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::{NavAction, RegisterAction};
    use crate::config::Config;

    fn ch(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn setup() -> (ModeController, Keymap) {
        let config = Config::default();
        (
            ModeController::new(Duration::from_millis(800)),
            Keymap::from_config(&config),
        )
    }

    #[test]
    fn dd_fires_stage_cut_and_returns_to_normal() {
        let (mut modes, keymap) = setup();
        let now = Instant::now();

        assert_eq!(modes.feed(&ch('d'), &keymap, now), KeyOutcome::Started);
        assert!(modes.is_pending());
        assert_eq!(
            modes.feed(&ch('d'), &keymap, now),
            KeyOutcome::Fired(Action::Register(RegisterAction::StageCut))
        );
        assert_eq!(modes.mode(), Mode::Normal);
    }

    #[test]
    fn mismatched_second_key_is_discarded() {
        let (mut modes, keymap) = setup();
        let now = Instant::now();

        modes.feed(&ch('y'), &keymap, now);
        assert_eq!(modes.feed(&ch('d'), &keymap, now), KeyOutcome::Abandoned);
        assert_eq!(modes.mode(), Mode::Normal);

        // the discarded key did not open a new sequence either
        assert_eq!(modes.feed(&ch('j'), &keymap, now), KeyOutcome::NotSequence);
    }

    #[test]
    fn pending_sequence_times_out() {
        let (mut modes, keymap) = setup();
        let start = Instant::now();

        modes.feed(&ch('d'), &keymap, start);
        let later = start + Duration::from_millis(900);
        assert!(modes.expire(later));
        assert_eq!(modes.mode(), Mode::Normal);

        // after the timeout a fresh d starts a new sequence instead of completing one
        assert_eq!(modes.feed(&ch('d'), &keymap, later), KeyOutcome::Started);
    }

    #[test]
    fn sequence_in_visual_returns_to_visual() {
        let (mut modes, keymap) = setup();
        let now = Instant::now();

        modes.enter_visual(3);
        modes.feed(&ch('g'), &keymap, now);
        assert_eq!(modes.visual_anchor(), Some(3));
        assert_eq!(
            modes.feed(&ch('g'), &keymap, now),
            KeyOutcome::Fired(Action::Nav(NavAction::GoToTop))
        );
        assert_eq!(modes.mode(), Mode::Visual { anchor: 3 });
    }

    #[test]
    fn ctrl_keys_never_start_sequences() {
        let (mut modes, keymap) = setup();
        let key = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(
            modes.feed(&key, &keymap, Instant::now()),
            KeyOutcome::NotSequence
        );
    }

    #[test]
    fn focus_follows_preview_scroll() {
        let (mut modes, _) = setup();
        assert_eq!(modes.focus(), Focus::List);
        modes.toggle_focus();
        assert_eq!(modes.mode(), Mode::PreviewScroll);
        assert_eq!(modes.focus(), Focus::Preview);
        modes.toggle_focus();
        assert_eq!(modes.focus(), Focus::List);
    }
}
