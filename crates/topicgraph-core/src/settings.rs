//! Assistant settings and their repository.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Parameters for the assistant-reply collaborator.
///
/// Stored with camelCase keys; any missing key keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Fills an empty api key from `key` (typically an environment variable).
    pub fn with_fallback_api_key(mut self, key: Option<String>) -> Self {
        if !self.has_api_key() {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                self.api_key = key;
            }
        }
        self
    }
}

/// Loads and stores [`Settings`].
pub trait SettingsRepository: Send + Sync {
    /// Stored settings overlaid on the defaults. Nothing stored means defaults.
    fn load(&self) -> Result<Settings>;

    fn save(&self, settings: &Settings) -> Result<()>;
}
