//! `SessionStore` on top of the key/value medium.
//!
//! All sessions live under a single `sessions` key as a JSON object of
//! session id to versioned snapshot.

use std::sync::Arc;

use serde_json::{Map, Value};
use version_migrate::Migrator;

use topicgraph_core::session::{Session, SessionStore};
use topicgraph_core::{Result, TopicGraphError};

use crate::dto::create_session_migrator;
use crate::storage::KeyValueStore;

pub const SESSIONS_KEY: &str = "sessions";

const ENTITY: &str = "session";
const LEGACY_VERSION: &str = "1.0.0";

pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
    migrator: Migrator,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            kv,
            migrator: create_session_migrator()?,
        })
    }

    fn load_entries(&self) -> Result<Map<String, Value>> {
        let Some(raw) = self.kv.get(SESSIONS_KEY)? else {
            return Ok(Map::new());
        };
        match serde_json::from_str(&raw)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(TopicGraphError::Serialization {
                format: "JSON".to_string(),
                message: format!("'{}' is not an object", SESSIONS_KEY),
            }),
        }
    }

    fn save_entries(&self, entries: Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string(&Value::Object(entries))?;
        self.kv.set(SESSIONS_KEY, &raw)
    }

    /// Migrates one stored snapshot. Snapshots without a version key are the
    /// legacy shape. The map key wins over an `id` inside the snapshot.
    fn decode(&self, id: &str, mut value: Value) -> Result<Session> {
        if let Value::Object(fields) = &mut value {
            fields
                .entry("version")
                .or_insert_with(|| Value::String(LEGACY_VERSION.to_string()));
        }

        let mut session: Session = self
            .migrator
            .load_flat_from(ENTITY, value)
            .map_err(|e| TopicGraphError::migration(format!("session '{}': {}", id, e)))?;
        if session.id != id {
            session.id = id.to_string();
        }
        Ok(session)
    }

    fn encode(&self, session: &Session) -> Result<Value> {
        let raw = self.migrator.save_domain_flat(ENTITY, session.clone())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SessionStore for KvSessionStore {
    fn list_all(&self) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .load_entries()?
            .into_iter()
            .filter_map(|(id, value)| match self.decode(&id, value) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "Skipping unreadable session");
                    None
                }
            })
            .collect();

        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }

    fn get(&self, session_id: &str) -> Result<Session> {
        let value = self
            .load_entries()?
            .remove(session_id)
            .ok_or_else(|| TopicGraphError::not_found(ENTITY, session_id))?;
        self.decode(session_id, value)
    }

    fn put(&self, session: &Session) -> Result<()> {
        let mut entries = self.load_entries()?;
        entries.insert(session.id.clone(), self.encode(session)?);
        self.save_entries(entries)
    }

    fn remove(&self, session_id: &str) -> Result<()> {
        let mut entries = self.load_entries()?;
        if entries.remove(session_id).is_some() {
            self.save_entries(entries)?;
        }
        Ok(())
    }
}
