#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use topicgraph_application::{ChatController, ControllerOptions, SessionManager};
use topicgraph_core::{Prompter, Result as CoreResult, TopicGraphError};
use topicgraph_core::reply::ReplyRequest;
use topicgraph_core::settings::{Settings, SettingsRepository};
use topicgraph_infrastructure::{
    KeyValueStore, KvAppStateStore, KvSessionStore, KvSettingsRepository, MemoryKeyValueStore,
};
use topicgraph_interaction::{AssistantReplier, ReplyError};

/// Replies with a fixed result and records every request.
pub struct StubReplier {
    result: Result<String, ReplyError>,
    pub requests: Mutex<Vec<ReplyRequest>>,
}

impl StubReplier {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: ReplyError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded(&self) -> Vec<ReplyRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantReplier for StubReplier {
    async fn reply(&self, _api_key: &str, request: &ReplyRequest) -> Result<String, ReplyError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

/// Answers every prompt the same way.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub title: Option<String>,
    pub accept_branch: bool,
    pub session_name: Option<String>,
}

impl Prompter for ScriptedPrompter {
    fn request_title(&self) -> Option<String> {
        self.title.clone()
    }

    fn confirm_branch(&self, _suggested_title: &str) -> bool {
        self.accept_branch
    }

    fn request_session_name(&self, _current_name: &str) -> Option<String> {
        self.session_name.clone()
    }
}

pub fn settings_with_key(key: &str) -> Settings {
    Settings {
        api_key: key.to_string(),
        ..Settings::default()
    }
}

/// A controller over an in-memory medium, returned with the medium so a
/// second controller can be opened on the same data.
pub fn controller_on(
    kv: Arc<dyn KeyValueStore>,
    settings: Option<Settings>,
    replier: Arc<dyn AssistantReplier>,
    prompter: Arc<dyn Prompter>,
    options: ControllerOptions,
) -> ChatController {
    let sessions = SessionManager::new(
        Arc::new(KvSessionStore::new(kv.clone()).unwrap()),
        Arc::new(KvAppStateStore::new(kv.clone())),
    );
    let settings_repo = Arc::new(KvSettingsRepository::new(kv));
    if let Some(settings) = settings {
        settings_repo.save(&settings).unwrap();
    }
    ChatController::new(sessions, settings_repo, replier, prompter, options).unwrap()
}

/// In-memory medium whose writes can be switched off.
#[derive(Default)]
pub struct FailingKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
}

impl FailingKeyValueStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> CoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TopicGraphError::persistence(format!("write to '{}' refused", key)));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingKeyValueStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.check(key)?;
        self.inner.remove(key)
    }
}

pub fn memory_kv() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

/// Deterministic options: no suggestions unless a test asks for them.
pub fn quiet_options() -> ControllerOptions {
    ControllerOptions {
        suggestion_probability: 0.0,
        rng_seed: Some(7),
        ..ControllerOptions::default()
    }
}
