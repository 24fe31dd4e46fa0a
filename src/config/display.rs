//! Display configuration options for fiander
//!
//! This module defines the display configuration options which are read from the fiander.toml
//! configuration file.

use ratatui::widgets::BorderType;
use serde::Deserialize;

use std::ffi::OsString;

/// Display configuration options
///
/// Holds border styles, preview settings, layout ratios and the scroll margin.
/// Default values are provided for all options so a partial `[display]` table works.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Display {
    borders: BorderShape,
    titles: bool,
    dir_marker: bool,
    preview: bool,
    scrolloff: usize,
    instant_preview: bool,
    preview_max_lines: usize,
    preview_method: PreviewMethod,
    bat: BatOptions,
    layout: LayoutConfig,
}

/// Public methods for accessing display configuration options
impl Display {
    pub fn border_shape(&self) -> &BorderShape {
        &self.borders
    }

    pub fn has_borders(&self) -> bool {
        !matches!(self.borders, BorderShape::None)
    }

    pub fn titles(&self) -> bool {
        self.titles
    }

    pub fn dir_marker(&self) -> bool {
        self.dir_marker
    }

    pub fn preview(&self) -> bool {
        self.preview
    }

    pub fn scrolloff(&self) -> usize {
        self.scrolloff
    }

    pub fn instant_preview(&self) -> bool {
        self.instant_preview
    }

    pub fn preview_max_lines(&self) -> usize {
        self.preview_max_lines.max(1)
    }

    pub fn preview_method(&self) -> &PreviewMethod {
        &self.preview_method
    }

    pub fn bat(&self) -> &BatOptions {
        &self.bat
    }

    /// List and preview widths as percentages summing to 100.
    pub fn ratios(&self) -> (u16, u16) {
        self.layout.normalized()
    }
}

/// Default display configuration options
impl Default for Display {
    fn default() -> Self {
        Display {
            borders: BorderShape::Square,
            titles: true,
            dir_marker: true,
            preview: true,
            scrolloff: 5,
            instant_preview: false,
            preview_max_lines: 400,
            preview_method: PreviewMethod::Internal,
            bat: BatOptions::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Layout configuration for the display panes
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct LayoutConfig {
    list: u16,
    preview: u16,
}

impl LayoutConfig {
    fn normalized(&self) -> (u16, u16) {
        let total = u32::from(self.list) + u32::from(self.preview);
        if total == 0 {
            return (50, 50);
        }
        let list = (u32::from(self.list) * 100 / total) as u16;
        (list, 100 - list)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            list: 40,
            preview: 60,
        }
    }
}

/// Preview method options
/// - Internal: Use the built-in preview functionality
/// - Bat: Use the external 'bat' command for previewing
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMethod {
    Internal,
    Bat,
}

/// Bat style options for file previewing
/// - Plain: No line numbers or decorations
/// - Numbers: Line numbers only
/// - Full: Full decorations including line numbers and grid
#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatStyle {
    #[default]
    Plain,
    Numbers,
    Full,
}

/// Options passed to `bat` when `preview_method = "bat"`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BatOptions {
    style: BatStyle,
    theme: Option<String>,
}

impl BatOptions {
    /// Command-line arguments for the 'bat' command.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![
            "--color=always".to_owned(),
            "--paging=never".to_owned(),
            "--wrap=never".to_owned(),
        ];
        match self.style {
            BatStyle::Plain => args.push("--style=plain".to_owned()),
            BatStyle::Numbers => args.push("--style=numbers".to_owned()),
            BatStyle::Full => args.push("--style=full".to_owned()),
        }
        if let Some(theme) = self.theme.as_deref().filter(|t| !t.is_empty()) {
            args.push("--theme".to_owned());
            args.push(theme.to_owned());
        }
        args.into_iter().map(OsString::from).collect()
    }
}

/// Border shape options
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BorderShape {
    None,
    Square,
    Rounded,
    Double,
    Thick,
}

impl BorderShape {
    pub fn as_border_type(&self) -> BorderType {
        match self {
            BorderShape::None | BorderShape::Square => BorderType::Plain,
            BorderShape::Rounded => BorderType::Rounded,
            BorderShape::Double => BorderType::Double,
            BorderShape::Thick => BorderType::Thick,
        }
    }
}
