//! Inspection Configuration
//!
//! Read from TOML text, e.g.
//!
//! ```toml
//! workers = 4
//! indent_width = 2
//! format = "json"
//! per_function = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ports::tree_printer::PrintOptions;

/// Output shape of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    Text,
    Json,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Worker threads for per-function dumps; `None` means half the cores
    pub workers: Option<usize>,
    pub indent_width: usize,
    pub format: DumpFormat,
    /// Also render each top-level function on its own
    pub per_function: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            workers: None,
            indent_width: PrintOptions::default().indent_width,
            format: DumpFormat::Text,
            per_function: false,
        }
    }
}

impl InspectConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid inspection config")
    }

    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            indent_width: self.indent_width,
        }
    }
}
