//! `AppStateStore` on top of the key/value medium.

use std::sync::Arc;

use topicgraph_core::Result;
use topicgraph_core::session::AppStateStore;

use crate::storage::KeyValueStore;

pub const LAST_ACTIVE_SESSION_KEY: &str = "lastActiveSessionId";

pub struct KvAppStateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvAppStateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

impl AppStateStore for KvAppStateStore {
    /// Accepts a JSON string or, as the browser stored it, bare text.
    fn last_active_session_id(&self) -> Result<Option<String>> {
        let Some(raw) = self.kv.get(LAST_ACTIVE_SESSION_KEY)? else {
            return Ok(None);
        };
        let id = serde_json::from_str::<String>(&raw).unwrap_or_else(|_| raw.trim().to_string());
        Ok(Some(id).filter(|id| !id.is_empty()))
    }

    fn set_last_active_session_id(&self, session_id: &str) -> Result<()> {
        self.kv
            .set(LAST_ACTIVE_SESSION_KEY, &serde_json::to_string(session_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_last_active_session_round_trip() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = KvAppStateStore::new(kv.clone());
        assert_eq!(store.last_active_session_id().unwrap(), None);

        store.set_last_active_session_id("abc").unwrap();
        assert_eq!(store.last_active_session_id().unwrap().as_deref(), Some("abc"));
        assert_eq!(kv.get(LAST_ACTIVE_SESSION_KEY).unwrap().as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_bare_text_is_accepted() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(LAST_ACTIVE_SESSION_KEY, "1700000000000\n").unwrap();
        let store = KvAppStateStore::new(kv);
        assert_eq!(
            store.last_active_session_id().unwrap().as_deref(),
            Some("1700000000000")
        );
    }
}
