//! Key mapping and action dispatch system for fiander
//!
//! Parses the `[keys]` table of the config into a lookup of single keys and two key
//! sequences, and defines the enum variants for every action fiander knows.

use crate::config::Config;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{HashMap, HashSet};

/// Represents any action in the app.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Nav(NavAction),
    Register(RegisterAction),
    View(ViewAction),
    System(SystemAction),
}

/// Cursor and directory movement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavAction {
    GoUp,
    GoDown,
    GoParent,
    GoIntoDir,
    GoToTop,
    GoToBottom,
    HalfPageUp,
    HalfPageDown,
    PageUp,
    PageDown,
    Back,
    Reload,
}

/// Staging and committing the clipboard register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterAction {
    StageCopy,
    StageCut,
    StageMove,
    Paste,
    Purge,
    Export,
    ClearRegister,
}

/// Listing and pane presentation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    Visual,
    ToggleHidden,
    CycleSort,
    ReverseSort,
    ToggleOutput,
    ToggleFocus,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SystemAction {
    Prompt,
    KeyBindHelp,
    Quit,
}

/// Key + modifiers as used in keybind/keymap
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// One parsed entry of a `[keys]` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Single(Key),
    Sequence(char, char),
}

/// Stores the mapping from keys to actions, built from the config
#[derive(Debug)]
pub struct Keymap {
    map: HashMap<Key, Action>,
    sequences: HashMap<(char, char), Action>,
    starters: HashSet<char>,
}

impl Keymap {
    /// Builds the keymap from the config
    #[rustfmt::skip]
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Keymap {
            map: HashMap::new(),
            sequences: HashMap::new(),
            starters: HashSet::new(),
        };
        let keys = config.keys();

        macro_rules! bind {
            ($keys:expr, $action:expr) => {
                keymap.bind($keys, $action);
            };
        }

        use NavAction as N;
        use RegisterAction as R;
        use ViewAction as V;
        use SystemAction as S;

        // NavActions
        bind!(keys.go_up(),             Action::Nav(N::GoUp));
        bind!(keys.go_down(),           Action::Nav(N::GoDown));
        bind!(keys.go_parent(),         Action::Nav(N::GoParent));
        bind!(keys.go_into_dir(),       Action::Nav(N::GoIntoDir));
        bind!(keys.go_to_top(),         Action::Nav(N::GoToTop));
        bind!(keys.go_to_bottom(),      Action::Nav(N::GoToBottom));
        bind!(keys.half_page_up(),      Action::Nav(N::HalfPageUp));
        bind!(keys.half_page_down(),    Action::Nav(N::HalfPageDown));
        bind!(keys.page_up(),           Action::Nav(N::PageUp));
        bind!(keys.page_down(),         Action::Nav(N::PageDown));
        bind!(keys.back(),              Action::Nav(N::Back));
        bind!(keys.reload(),            Action::Nav(N::Reload));

        // RegisterActions
        bind!(keys.stage_copy(),        Action::Register(R::StageCopy));
        bind!(keys.stage_cut(),         Action::Register(R::StageCut));
        bind!(keys.stage_move(),        Action::Register(R::StageMove));
        bind!(keys.paste(),             Action::Register(R::Paste));
        bind!(keys.purge(),             Action::Register(R::Purge));
        bind!(keys.export(),            Action::Register(R::Export));
        bind!(keys.clear_register(),    Action::Register(R::ClearRegister));

        // ViewActions
        bind!(keys.visual(),            Action::View(V::Visual));
        bind!(keys.toggle_hidden(),     Action::View(V::ToggleHidden));
        bind!(keys.cycle_sort(),        Action::View(V::CycleSort));
        bind!(keys.reverse_sort(),      Action::View(V::ReverseSort));
        bind!(keys.toggle_output(),     Action::View(V::ToggleOutput));
        bind!(keys.toggle_focus(),      Action::View(V::ToggleFocus));

        // SystemActions
        bind!(keys.prompt(),            Action::System(S::Prompt));
        bind!(keys.keybind_help(),      Action::System(S::KeyBindHelp));
        bind!(keys.quit(),              Action::System(S::Quit));

        keymap
    }

    fn bind(&mut self, key_list: &[String], action: Action) {
        for k in key_list {
            match parse_binding(k) {
                Some(Binding::Single(key)) => {
                    self.map.insert(key, action);
                }
                Some(Binding::Sequence(first, second)) => {
                    self.sequences.insert((first, second), action);
                    self.starters.insert(first);
                }
                None => tracing::warn!(key = %k, ?action, "ignoring unparsable key binding"),
            }
        }
    }

    /// Looks up the action for a given key event
    pub fn lookup(&self, key: KeyEvent) -> Option<Action> {
        let k = Key {
            code: key.code,
            modifiers: key.modifiers,
        };

        if let Some(action) = self.map.get(&k).copied() {
            return Some(action);
        }

        if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(KeyModifiers::SHIFT) {
            let k2 = Key {
                code: key.code,
                modifiers: key.modifiers - KeyModifiers::SHIFT,
            };
            return self.map.get(&k2).copied();
        }
        None
    }

    /// True if `c` is the first key of any bound sequence.
    #[inline]
    pub fn starts_sequence(&self, c: char) -> bool {
        self.starters.contains(&c)
    }

    #[inline]
    pub fn sequence(&self, first: char, second: char) -> Option<Action> {
        self.sequences.get(&(first, second)).copied()
    }
}

/// Parses a key string. Two plain characters that are not a key name bind a sequence.
pub fn parse_binding(s: &str) -> Option<Binding> {
    if let Some(key) = parse_key(s) {
        return Some(Binding::Single(key));
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), None) if !a.is_whitespace() && !b.is_whitespace() && a != '<' => {
            Some(Binding::Sequence(a, b))
        }
        _ => None,
    }
}

pub fn parse_key(s: &str) -> Option<Key> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code: Option<KeyCode> = None;

    // single characters bind literally, including '-' and '+'
    let mut single = s.chars();
    if let (Some(c), None) = (single.next(), single.next()) {
        return Some(Key {
            code: KeyCode::Char(c),
            modifiers,
        });
    }

    let is_bracketed = s.starts_with('<') && s.ends_with('>');
    let mut input = s.trim_start_matches('<').trim_end_matches('>').to_string();

    if is_bracketed && input.contains('-') {
        let parts: Vec<&str> = input.split('-').collect();

        for &prefix in parts.iter().take(parts.len().saturating_sub(1)) {
            match prefix.to_lowercase().as_str() {
                "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "a" | "m" | "alt" => modifiers |= KeyModifiers::ALT,
                "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }
        input = parts.last()?.to_string();
    }

    let normalized = input.replace('-', "+");
    for part in normalized.split('+') {
        let p_low = part.to_lowercase();
        match p_low.as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "meta" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,

            "up" => code = Some(KeyCode::Up),
            "down" => code = Some(KeyCode::Down),
            "left" => code = Some(KeyCode::Left),
            "right" => code = Some(KeyCode::Right),
            "enter" | "return" => code = Some(KeyCode::Enter),
            "esc" | "escape" => code = Some(KeyCode::Esc),
            "backspace" | "back" => code = Some(KeyCode::Backspace),
            "tab" => code = Some(KeyCode::Tab),
            "home" => code = Some(KeyCode::Home),
            "end" => code = Some(KeyCode::End),
            "pageup" | "pgup" => code = Some(KeyCode::PageUp),
            "pagedown" | "pgdn" => code = Some(KeyCode::PageDown),
            "delete" | "del" => code = Some(KeyCode::Delete),
            "space" | "spc" => code = Some(KeyCode::Char(' ')),

            _ => {
                if part.chars().count() == 1 {
                    let mut c = part.chars().next()?;
                    if modifiers.contains(KeyModifiers::SHIFT) {
                        c = c.to_ascii_uppercase();
                    }
                    code = Some(KeyCode::Char(c));
                } else if p_low.starts_with('f')
                    && p_low.len() > 1
                    && p_low[1..].chars().all(|c| c.is_ascii_digit())
                {
                    let n = p_low[1..].parse().ok()?;
                    code = Some(KeyCode::F(n));
                } else if part.is_empty() {
                    continue;
                } else {
                    return None;
                }
            }
        }
    }

    // Shift on a letter is expressed by its case, crossterm reports some terminals either way
    if let Some(KeyCode::Char(c)) = code
        && c.is_ascii_uppercase()
    {
        modifiers -= KeyModifiers::SHIFT;
    }

    Some(Key {
        code: code?,
        modifiers,
    })
}
