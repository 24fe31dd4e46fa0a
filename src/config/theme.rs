//! Theme configuration options for fiander
//!
//! This module defines the theme configuration options which are read from the fiander.toml
//! configuration file. Unset colours fall back to the internal defaults.

use crate::utils::parse_color;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use std::sync::LazyLock;

/// Theme configuration options
/// # Examples
/// ```toml
/// [theme.directory]
/// fg = "cyan"
/// [theme.cursor]
/// bg = "#303030"
/// ```
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Theme {
    entry: ColorPair,
    directory: ColorPair,
    #[serde(deserialize_with = "deserialize_color_field")]
    symlink: Color,
    #[serde(deserialize_with = "deserialize_color_field")]
    executable: Color,
    cursor: ColorPair,
    visual: ColorPair,
    staged: ColorPair,
    path: ColorPair,
    status_line: ColorPair,
    mode: ColorPair,
    border: ColorPair,
    focus_border: ColorPair,
    notice: ColorPair,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            entry: ColorPair::default(),
            directory: ColorPair {
                fg: Color::Blue,
                ..ColorPair::default()
            },
            symlink: Color::Magenta,
            executable: Color::Green,
            cursor: ColorPair {
                bg: Color::Indexed(236),
                ..ColorPair::default()
            },
            visual: ColorPair {
                fg: Color::Black,
                bg: Color::Yellow,
            },
            staged: ColorPair {
                fg: Color::Green,
                ..ColorPair::default()
            },
            path: ColorPair {
                fg: Color::Magenta,
                ..ColorPair::default()
            },
            status_line: ColorPair::default(),
            mode: ColorPair {
                fg: Color::Black,
                bg: Color::Cyan,
            },
            border: ColorPair {
                fg: Color::Indexed(238),
                ..ColorPair::default()
            },
            focus_border: ColorPair {
                fg: Color::Cyan,
                ..ColorPair::default()
            },
            notice: ColorPair {
                fg: Color::DarkGray,
                ..ColorPair::default()
            },
        }
    }
}

impl Theme {
    /// Internal default theme, used as the fallback when a colour is left at Reset.
    pub fn internal_defaults() -> &'static Self {
        static DEFAULT: LazyLock<Theme> = LazyLock::new(Theme::default);
        &DEFAULT
    }

    pub fn entry_style(&self) -> Style {
        self.entry.style_or(&Theme::internal_defaults().entry)
    }

    pub fn directory_style(&self) -> Style {
        self.directory
            .style_or(&Theme::internal_defaults().directory)
            .add_modifier(Modifier::BOLD)
    }

    pub fn symlink(&self) -> Color {
        or_reset(self.symlink, Theme::internal_defaults().symlink)
    }

    pub fn executable(&self) -> Color {
        or_reset(self.executable, Theme::internal_defaults().executable)
    }

    pub fn cursor_style(&self) -> Style {
        self.cursor.style_or(&Theme::internal_defaults().cursor)
    }

    pub fn visual_style(&self) -> Style {
        self.visual.style_or(&Theme::internal_defaults().visual)
    }

    pub fn staged_style(&self) -> Style {
        self.staged.style_or(&Theme::internal_defaults().staged)
    }

    pub fn path_style(&self) -> Style {
        self.path.style_or(&Theme::internal_defaults().path)
    }

    pub fn status_line_style(&self) -> Style {
        self.status_line
            .style_or(&Theme::internal_defaults().status_line)
    }

    pub fn mode_style(&self) -> Style {
        self.mode
            .style_or(&Theme::internal_defaults().mode)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.focus_border
                .style_or(&Theme::internal_defaults().focus_border)
        } else {
            self.border.style_or(&Theme::internal_defaults().border)
        }
    }

    pub fn notice_style(&self) -> Style {
        self.notice
            .style_or(&Theme::internal_defaults().notice)
            .add_modifier(Modifier::ITALIC)
    }
}

fn or_reset(color: Color, fallback: Color) -> Color {
    if color == Color::Reset {
        fallback
    } else {
        color
    }
}

/// ColorPair struct to hold foreground and background colors.
/// Used throughout the theme configuration.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ColorPair {
    #[serde(default, deserialize_with = "deserialize_color_field")]
    fg: Color,
    #[serde(default, deserialize_with = "deserialize_color_field")]
    bg: Color,
}

/// Sets both foreground and background to Color::Reset
impl Default for ColorPair {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

impl ColorPair {
    /// Resolves the ColorPair by replacing Reset colors with those from another ColorPair.
    pub fn resolve(&self, other: &ColorPair) -> Self {
        Self {
            fg: or_reset(self.fg, other.fg),
            bg: or_reset(self.bg, other.bg),
        }
    }

    /// Converts the ColorPair to a Style, falling back to the provided fallback ColorPair for Reset colors.
    pub fn style_or(&self, fallback: &ColorPair) -> Style {
        let resolved = self.resolve(fallback);
        Style::default().fg(resolved.fg).bg(resolved.bg)
    }
}

fn deserialize_color_field<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(parse_color(&s))
}
