//! Persistence boundaries for sessions and application state.

use super::model::Session;
use crate::error::Result;

/// Durable map of session id to session snapshot.
///
/// Every operation is synchronous and total: a `put` either replaces the whole
/// entry or fails leaving the previous entry readable.
pub trait SessionStore: Send + Sync {
    /// Every readable session, oldest first.
    ///
    /// Entries that cannot be read are skipped.
    fn list_all(&self) -> Result<Vec<Session>>;

    /// Loads one session.
    ///
    /// # Returns
    ///
    /// - `Ok(Session)`: the stored snapshot
    /// - `Err(NotFound)`: no entry with this id
    /// - `Err(Migration | Serialization)`: the entry exists but cannot be read
    fn get(&self, session_id: &str) -> Result<Session>;

    /// Inserts or overwrites the entry for `session.id`.
    fn put(&self, session: &Session) -> Result<()>;

    /// Removes an entry. Removing an unknown id is not an error.
    fn remove(&self, session_id: &str) -> Result<()>;
}

/// Small pieces of state that survive a restart.
pub trait AppStateStore: Send + Sync {
    fn last_active_session_id(&self) -> Result<Option<String>>;

    fn set_last_active_session_id(&self, session_id: &str) -> Result<()>;
}
