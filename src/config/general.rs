//! The general configuration settings for fiander.
//!
//! This module defines the [General] struct for deserializing
//! general settings from the fiander.toml configuration file
//! and the [InternalGeneral] struct for internal use within fiander.

use crate::core::{SortKey, SortOrder, SortSpec};

use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
    sort: SortKey,
    sort_reverse: bool,
    move_to_trash: bool,
    log_level: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            dirs_first: true,
            show_hidden: true,
            case_insensitive: true,
            sort: SortKey::Name,
            sort_reverse: false,
            move_to_trash: true,
            log_level: "info".into(),
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    sort: SortSpec,
    show_hidden: bool,
    move_to_trash: bool,
    log_level: String,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        let order = if g.sort_reverse {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        let level = g.log_level.trim().to_lowercase();
        Self {
            sort: SortSpec {
                key: g.sort,
                order,
                dirs_first: g.dirs_first,
                case_insensitive: g.case_insensitive,
            },
            show_hidden: g.show_hidden,
            move_to_trash: g.move_to_trash,
            log_level: if level.is_empty() { "info".into() } else { level },
        }
    }
}

impl InternalGeneral {
    #[inline]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn move_to_trash(&self) -> bool {
        self.move_to_trash
    }

    #[inline]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
