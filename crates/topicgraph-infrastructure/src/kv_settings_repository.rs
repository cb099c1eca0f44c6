//! `SettingsRepository` on top of the key/value medium.

use std::sync::Arc;

use serde_json::Value;

use topicgraph_core::Result;
use topicgraph_core::settings::{Settings, SettingsRepository};

use crate::storage::KeyValueStore;

pub const SETTINGS_KEY: &str = "settings";

pub struct KvSettingsRepository {
    kv: Arc<dyn KeyValueStore>,
    defaults: Settings,
}

impl KvSettingsRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            defaults: Settings::default(),
        }
    }

    /// Uses `defaults` for every field the stored settings lack.
    pub fn with_defaults(mut self, defaults: Settings) -> Self {
        self.defaults = defaults;
        self
    }

    fn overlay(&self, stored: Value) -> Result<Settings> {
        let mut merged = serde_json::to_value(&self.defaults)?;
        if let (Value::Object(base), Value::Object(fields)) = (&mut merged, stored) {
            for (key, value) in fields {
                if !value.is_null() {
                    base.insert(key, value);
                }
            }
        }
        Ok(serde_json::from_value(merged)?)
    }
}

impl SettingsRepository for KvSettingsRepository {
    /// Unreadable settings fall back to the defaults.
    fn load(&self) -> Result<Settings> {
        let Some(raw) = self.kv.get(SETTINGS_KEY)? else {
            return Ok(self.defaults.clone());
        };

        match serde_json::from_str::<Value>(&raw)
            .map_err(Into::into)
            .and_then(|v| self.overlay(v))
        {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, "Stored settings unreadable, using defaults");
                Ok(self.defaults.clone())
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.kv.set(SETTINGS_KEY, &serde_json::to_string(settings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_missing_settings_are_defaults() {
        let repo = KvSettingsRepository::new(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(repo.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_stored_fields_overlay_defaults() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(SETTINGS_KEY, r#"{"apiKey":"sk-1","temperature":null}"#).unwrap();
        let repo = KvSettingsRepository::new(kv).with_defaults(Settings {
            model: "gpt-4o".into(),
            ..Settings::default()
        });

        let settings = repo.load().unwrap();
        assert_eq!(settings.api_key, "sk-1");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.temperature, Settings::default().temperature);
    }

    #[test]
    fn test_save_then_load() {
        let repo = KvSettingsRepository::new(Arc::new(MemoryKeyValueStore::new()));
        let settings = Settings {
            api_key: "sk-2".into(),
            max_tokens: 300,
            ..Settings::default()
        };
        repo.save(&settings).unwrap();
        assert_eq!(repo.load().unwrap(), settings);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(SETTINGS_KEY, "not json").unwrap();
        let repo = KvSettingsRepository::new(kv);
        assert_eq!(repo.load().unwrap(), Settings::default());
    }
}
