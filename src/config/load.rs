//! The main config loading module for fiander.
//!
//! Handles loading and deserializing settings from `fiander.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for
//! parsing. Also implements default config generation for `fiander --init`.

use crate::config::{Display, Editor, ExportConfig, General, Input, InternalGeneral, Keys, Theme};
use crate::core::ConfigError;
use crate::utils::get_home;

use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Raw configuration as read from the toml file
/// This struct is deserialized directly from the toml file.
/// It uses owned types and is then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    display: Display,
    input: Input,
    export: ExportConfig,
    theme: Theme,
    editor: Editor,
    keys: Keys,
}

/// Main configuration struct for fiander
/// This struct holds the processed configuration options used by fiander.
#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
    display: Display,
    input: Input,
    export: ExportConfig,
    theme: Theme,
    editor: Editor,
    keys: Keys,
}

/// Conversion from RawConfig to Config
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            display: raw.display,
            input: raw.input,
            export: raw.export,
            theme: raw.theme,
            editor: raw.editor,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file means internal defaults. A file that cannot be read or parsed also falls
    /// back to the defaults, and the error is returned next to them for the caller to report.
    pub fn load() -> (Self, Option<ConfigError>) {
        let path = Self::default_path();
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::from_path(&path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw = toml::from_str::<RawConfig>(content)?;
        Ok(raw.into())
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[inline]
    pub fn input(&self) -> &Input {
        &self.input
    }

    #[inline]
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    #[inline]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Determine the default configuration file path.
    /// Checks the FIANDER_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/fiander/fiander.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("FIANDER_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("fiander/fiander.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/fiander/fiander.toml");
        }
        PathBuf::from("fiander.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)?;
        println!("Default config generated at {:?}", path);
        Ok(())
    }
}

/// Default configuration options
impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

const DEFAULT_TOML: &str = r##"# fiander.toml - default configuration for fiander

# Note:
# Commented values are the internal defaults of fiander
# Use hex codes (eg. "#RRGGBB") or terminal colors ("cyan")

[general]
# dirs_first = true
# show_hidden = true
# case_insensitive = true
# sort = "name"              # "name", "size" or "modified"
# sort_reverse = false
# move_to_trash = true
# log_level = "info"         # overridden by FIANDER_LOG

[display]
# borders = "square"         # "none", "square", "rounded", "double", "thick"
# titles = true
# dir_marker = true
# preview = true
# scrolloff = 5
# instant_preview = false
# preview_max_lines = 400
# preview_method = "internal"  # or "bat"

# [display.bat]
# style = "plain"
# theme = "ansi"

# [display.layout]
# list = 40
# preview = 60

[input]
# sequence_timeout_ms = 800
# history = 64

[export]
# preamble = "please analyze this project, add tell how to possibly extend it\n"
# chunk_size = 64
# max_file_bytes = 1048576
# ignore_dirs = ["__pycache__", "node_modules", ".git", ".hg", ".venv", "venv", "env", ".idea", ".pytest_cache", "dist", "build"]
# ignore_patterns = ["*.pyc", "*.pyo", "*.pyd", "*.so", "*.dll", "*.exe", "*.class", "*.jar", "*.lock", "*.log", "*.db", "*.sqlite", "*.bak", "*.tmp", "*.DS_Store"]
# ignore_names = ["Thumbs.db"]

# [theme]
# symlink = "magenta"
# executable = "green"
# [theme.directory]
# fg = "blue"
# [theme.cursor]
# bg = "#303030"
# [theme.visual]
# fg = "black"
# bg = "yellow"

# [editor]
# cmd = "nvim"               # falls back to $EDITOR, then vim

# [keys]
# go_up = ["k", "Up"]
# go_down = ["j", "Down"]
# go_parent = ["h", "Left"]
# go_into_dir = ["l", "Right", "Enter"]
# go_to_top = ["gg", "Home"]
# go_to_bottom = ["G", "End"]
# half_page_up = ["Ctrl+u"]
# half_page_down = ["Ctrl+d"]
# page_up = ["PageUp"]
# page_down = ["PageDown"]
# back = ["-", "Backspace"]
# toggle_hidden = ["."]
# cycle_sort = ["s"]
# reverse_sort = ["S"]
# reload = ["Ctrl+r"]
# visual = ["v", "V"]
# stage_copy = ["yy"]
# stage_cut = ["dd"]
# stage_move = ["mm"]
# paste = ["p"]
# purge = ["D"]
# export = ["X"]
# clear_register = ["Ctrl+c"]
# toggle_output = ["o"]
# toggle_focus = ["Tab"]
# prompt = [":"]
# keybind_help = ["?"]
# quit = ["q"]
"##;
