//! Where TopicGraph keeps its files.
//!
//! ```text
//! $TOPICGRAPH_HOME or ~/.config/topicgraph/
//! ├── config.toml                # optional application configuration
//! ├── sessions.json              # every session snapshot
//! ├── settings.json              # assistant settings
//! └── lastActiveSessionId.json   # session restored on the next start
//! ```
//!
//! `data_dir` in `config.toml` moves the JSON files elsewhere; `config.toml`
//! itself always stays in the base directory.

use std::path::{Path, PathBuf};

use topicgraph_core::config::AppConfig;
use topicgraph_core::{Result, TopicGraphError};

pub const HOME_ENV: &str = "TOPICGRAPH_HOME";
pub const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "topicgraph";

pub struct TopicGraphPaths;

impl TopicGraphPaths {
    /// `$TOPICGRAPH_HOME` when set, else the platform config directory.
    pub fn base_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TopicGraphError::persistence("cannot determine config directory"))
    }

    pub fn config_file(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Directory of the key/value files for a given configuration.
    pub fn data_dir(base_dir: &Path, config: &AppConfig) -> PathBuf {
        match &config.data_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        }
    }
}

/// Reads `config.toml` from `base_dir`. A missing file yields the defaults.
pub fn load_app_config(base_dir: &Path) -> Result<AppConfig> {
    let path = TopicGraphPaths::config_file(base_dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(&path)?;
    AppConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(load_app_config(temp_dir.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_config_file_is_read_and_data_dir_resolved() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "data_dir = \"store\"\nhistory_window = 8\n",
        )
        .unwrap();

        let config = load_app_config(temp_dir.path()).unwrap();
        assert_eq!(config.history_window, 8);
        assert_eq!(
            TopicGraphPaths::data_dir(temp_dir.path(), &config),
            temp_dir.path().join("store")
        );
        assert_eq!(
            TopicGraphPaths::data_dir(temp_dir.path(), &AppConfig::default()),
            temp_dir.path()
        );
    }
}
