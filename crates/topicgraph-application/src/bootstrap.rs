//! Wires the file-backed stores, the HTTP replier and a prompter into a
//! ready [`ChatController`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use topicgraph_core::config::AppConfig;
use topicgraph_core::settings::Settings;
use topicgraph_core::{Prompter, Result};
use topicgraph_infrastructure::{
    FileKeyValueStore, KeyValueStore, KvAppStateStore, KvSessionStore, KvSettingsRepository,
    TopicGraphPaths, load_app_config,
};
use topicgraph_interaction::{AssistantReplier, OpenAiReplier};

use crate::chat_controller::{ChatController, ControllerOptions};
use crate::session_manager::SessionManager;

/// Environment variable consulted when no api key has been saved.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolved locations and configuration for one run.
#[derive(Debug, Clone)]
pub struct Environment {
    pub base_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl Environment {
    /// Reads `config.toml` from the base directory (`TOPICGRAPH_HOME` or
    /// the platform default).
    pub fn discover() -> Result<Self> {
        Self::at(&TopicGraphPaths::base_dir()?)
    }

    pub fn at(base_dir: &Path) -> Result<Self> {
        let config = load_app_config(base_dir)?;
        let data_dir = TopicGraphPaths::data_dir(base_dir, &config);
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            data_dir,
            config,
        })
    }

    fn default_settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(model) = &self.config.default_model {
            settings.model = model.clone();
        }
        settings
    }
}

/// Builds a controller over the file-backed stores in `env.data_dir`.
pub fn build_controller(env: &Environment, prompter: Arc<dyn Prompter>) -> Result<ChatController> {
    let replier: Arc<dyn AssistantReplier> = Arc::new(OpenAiReplier::new());
    build_controller_with(env, prompter, replier)
}

/// Like [`build_controller`] with a caller-supplied replier.
pub fn build_controller_with(
    env: &Environment,
    prompter: Arc<dyn Prompter>,
    replier: Arc<dyn AssistantReplier>,
) -> Result<ChatController> {
    tracing::debug!(data_dir = %env.data_dir.display(), "Opening storage");
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(env.data_dir.clone()));

    let sessions = SessionManager::new(
        Arc::new(KvSessionStore::new(kv.clone())?),
        Arc::new(KvAppStateStore::new(kv.clone())),
    );
    let settings_repo =
        Arc::new(KvSettingsRepository::new(kv).with_defaults(env.default_settings()));

    let options = ControllerOptions {
        fallback_api_key: std::env::var(API_KEY_ENV).ok(),
        ..ControllerOptions::from_config(&env.config)
    };

    ChatController::new(sessions, settings_repo, replier, prompter, options)
}
