//! Input configuration options for fiander
//!
//! This module defines the `[keys]`, `[input]` and `[editor]` tables of the fiander.toml
//! configuration file.

use serde::Deserialize;

/// Key strings of all actions.
///
/// A two character string such as `"dd"` binds a key sequence.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Keys {
    go_up: Vec<String>,
    go_down: Vec<String>,
    go_parent: Vec<String>,
    go_into_dir: Vec<String>,
    go_to_top: Vec<String>,
    go_to_bottom: Vec<String>,
    half_page_up: Vec<String>,
    half_page_down: Vec<String>,
    page_up: Vec<String>,
    page_down: Vec<String>,
    back: Vec<String>,
    toggle_hidden: Vec<String>,
    cycle_sort: Vec<String>,
    reverse_sort: Vec<String>,
    reload: Vec<String>,
    visual: Vec<String>,
    stage_copy: Vec<String>,
    stage_cut: Vec<String>,
    stage_move: Vec<String>,
    paste: Vec<String>,
    purge: Vec<String>,
    export: Vec<String>,
    clear_register: Vec<String>,
    toggle_output: Vec<String>,
    toggle_focus: Vec<String>,
    prompt: Vec<String>,
    keybind_help: Vec<String>,
    quit: Vec<String>,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    go_up,
    go_down,
    go_parent,
    go_into_dir,
    go_to_top,
    go_to_bottom,
    half_page_up,
    half_page_down,
    page_up,
    page_down,
    back,
    toggle_hidden,
    cycle_sort,
    reverse_sort,
    reload,
    visual,
    stage_copy,
    stage_cut,
    stage_move,
    paste,
    purge,
    export,
    clear_register,
    toggle_output,
    toggle_focus,
    prompt,
    keybind_help,
    quit,
);

/// Default input configuration options
impl Default for Keys {
    fn default() -> Self {
        Keys {
            go_up: vec!["k".into(), "Up".into()],
            go_down: vec!["j".into(), "Down".into()],
            go_parent: vec!["h".into(), "Left".into()],
            go_into_dir: vec!["l".into(), "Right".into(), "Enter".into()],
            go_to_top: vec!["gg".into(), "Home".into()],
            go_to_bottom: vec!["G".into(), "End".into()],
            half_page_up: vec!["Ctrl+u".into()],
            half_page_down: vec!["Ctrl+d".into()],
            page_up: vec!["PageUp".into()],
            page_down: vec!["PageDown".into()],
            back: vec!["-".into(), "Backspace".into()],

            toggle_hidden: vec![".".into()],
            cycle_sort: vec!["s".into()],
            reverse_sort: vec!["S".into()],
            reload: vec!["Ctrl+r".into()],

            visual: vec!["v".into(), "V".into()],
            stage_copy: vec!["yy".into()],
            stage_cut: vec!["dd".into()],
            stage_move: vec!["mm".into()],
            paste: vec!["p".into()],
            purge: vec!["D".into()],
            export: vec!["X".into()],
            clear_register: vec!["Ctrl+c".into()],
            toggle_output: vec!["o".into()],

            toggle_focus: vec!["Tab".into()],
            prompt: vec![":".into()],
            keybind_help: vec!["?".into()],
            quit: vec!["q".into()],
        }
    }
}

/// Timing and history limits for input handling.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Input {
    sequence_timeout_ms: u64,
    history: usize,
}

impl Input {
    #[inline]
    pub fn sequence_timeout_ms(&self) -> u64 {
        self.sequence_timeout_ms
    }

    #[inline]
    pub fn history(&self) -> usize {
        self.history.max(1)
    }
}

impl Default for Input {
    fn default() -> Self {
        Input {
            sequence_timeout_ms: 800,
            history: 64,
        }
    }
}

/// Editor configuration options
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Editor {
    cmd: String,
}

/// Public methods for accessing editor configuration options
impl Editor {
    /// The configured command, else `$EDITOR`, else `vim`.
    pub fn cmd(&self) -> String {
        let trimmed = self.cmd.trim();
        if !trimmed.is_empty() {
            return trimmed.to_owned();
        }
        std::env::var("EDITOR")
            .ok()
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "vim".to_owned())
    }

    pub fn exists(&self) -> bool {
        let cmd = self.cmd();
        let program = cmd.split_whitespace().next().unwrap_or("vim");
        which::which(program).is_ok()
    }
}
