//! Persistence for TopicGraph: the key/value medium, versioned session
//! snapshots and the repository implementations built on them.

pub mod dto;
pub mod kv_session_store;
pub mod kv_settings_repository;
pub mod kv_state_store;
pub mod paths;
pub mod storage;

pub use kv_session_store::KvSessionStore;
pub use kv_settings_repository::KvSettingsRepository;
pub use kv_state_store::KvAppStateStore;
pub use paths::{TopicGraphPaths, load_app_config};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
