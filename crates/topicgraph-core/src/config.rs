use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Messages of conversation context handed to the assistant by default.
pub const DEFAULT_HISTORY_WINDOW: usize = 15;

/// Optional `config.toml` in the data directory.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Overrides where sessions and settings are stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Model used when no settings have been saved yet.
    #[serde(default)]
    pub default_model: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            default_model: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
