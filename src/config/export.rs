//! The `[export]` table: preamble and ignore lists for catlsr exports.

use crate::core::export::{
    DEFAULT_IGNORE_DIRS, DEFAULT_IGNORE_NAMES, DEFAULT_IGNORE_PATTERNS, DEFAULT_MAX_FILE_BYTES,
    DEFAULT_PREAMBLE, ExportRules,
};
use crate::core::ExportError;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ExportConfig {
    preamble: String,
    chunk_size: usize,
    max_file_bytes: u64,
    ignore_dirs: Vec<String>,
    ignore_patterns: Vec<String>,
    ignore_names: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            preamble: DEFAULT_PREAMBLE.to_owned(),
            chunk_size: 64,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            ignore_dirs: owned(DEFAULT_IGNORE_DIRS),
            ignore_patterns: owned(DEFAULT_IGNORE_PATTERNS),
            ignore_names: owned(DEFAULT_IGNORE_NAMES),
        }
    }
}

impl ExportConfig {
    #[inline]
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Walk entries processed per event loop tick.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Compiles the ignore lists.
    pub fn rules(&self) -> Result<ExportRules, ExportError> {
        ExportRules::new(
            &self.ignore_dirs,
            &self.ignore_names,
            &self.ignore_patterns,
            self.max_file_bytes,
        )
    }
}
