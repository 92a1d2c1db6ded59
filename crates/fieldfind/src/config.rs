//! Finder configuration (`fieldfind.toml`)
//!
//! ```toml
//! [finder]
//! debug_log = true          # timing / success messages
//! report_not_found = true   # NotFound diagnostics when not suppressed
//! tag = "my-plugin"         # appended to every diagnostic
//! ```
//!
//! Every key is optional. A missing `[finder]` table yields the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Diagnostics policy of a [`crate::Finder`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinderConfig {
    /// Emit "found member, took N ms" messages
    #[serde(default = "default_true")]
    pub debug_log: bool,

    /// Emit NotFound diagnostics. Backend failures are reported regardless.
    #[serde(default = "default_true")]
    pub report_not_found: bool,

    /// Tag appended to every diagnostic
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_true() -> bool {
    true
}

fn default_tag() -> String {
    "fieldfind".to_string()
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            debug_log: default_true(),
            report_not_found: default_true(),
            tag: default_tag(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    finder: FinderConfig,
}

impl FinderConfig {
    /// Parse from TOML text containing an optional `[finder]` table
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.finder)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
