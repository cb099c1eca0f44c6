//! Session lifecycle and the live working copy.

use std::sync::Arc;

use topicgraph_core::branching::ensure_initial_topic;
use topicgraph_core::session::{
    AppStateStore, DEFAULT_SESSION_NAME, Session, SessionStore, SessionSummary,
    favorite_sessions, search_sessions,
};
use topicgraph_core::topic::{Message, Sender};
use topicgraph_core::{Prompter, Result, TopicGraphError};

/// Owns the one checked-out session and keeps the store in step with it.
///
/// `SessionManager` is responsible for:
/// - Creating, switching, renaming, favoriting and deleting sessions
/// - Holding the active session as the sole mutable working copy
/// - Writing the working copy through to the `SessionStore` after every change
///
/// Snapshots handed to the store are independent copies; nothing mutable is
/// shared between the working copy and stored data.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    app_state: Arc<dyn AppStateStore>,
    active: Option<Session>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, app_state: Arc<dyn AppStateStore>) -> Self {
        Self {
            store,
            app_state,
            active: None,
        }
    }

    /// Cold start: restores the last active session, falls back to the oldest
    /// one, or creates `"New Session"` when nothing is stored.
    pub fn startup(&mut self, prompter: &dyn Prompter) -> Result<()> {
        let sessions = self.store.list_all()?;
        if sessions.is_empty() {
            tracing::info!("No stored sessions, creating the default session");
            self.create_session(Some(DEFAULT_SESSION_NAME), prompter)?;
            return Ok(());
        }

        let last_active = self.app_state.last_active_session_id().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read last active session");
            None
        });
        let target = last_active
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .unwrap_or_else(|| sessions[0].id.clone());

        self.switch_to(&target)
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.id.as_str())
    }

    /// Creates a session, makes it active and gives it its initial topic.
    ///
    /// Without a name the session is called `"Session {count+1}"` and the
    /// prompter is asked for a better one right away.
    pub fn create_session(
        &mut self,
        name: Option<&str>,
        prompter: &dyn Prompter,
    ) -> Result<SessionSummary> {
        let given = name.map(str::trim).filter(|n| !n.is_empty());
        let name = match given {
            Some(name) => name.to_string(),
            None => format!("Session {}", self.store.list_all()?.len() + 1),
        };

        let session = Session::new(name);
        let session_id = session.id.clone();
        self.store.put(&session)?;
        tracing::info!(session_id = %session_id, name = %session.name, "Created session");

        self.switch_to(&session_id)?;

        if given.is_none() {
            let current_name = self.active.as_ref().map(|s| s.name.clone()).unwrap_or_default();
            if let Some(new_name) = prompter.request_session_name(&current_name) {
                self.rename_session(&session_id, &new_name)?;
            }
        }

        self.active
            .as_ref()
            .map(Session::summary)
            .ok_or_else(|| TopicGraphError::internal("created session is not active"))
    }

    /// Flushes the working copy, then checks out `session_id`.
    ///
    /// An unknown id is a no-op error and the current session stays active.
    pub fn switch_to(&mut self, session_id: &str) -> Result<()> {
        if self.active_id() == Some(session_id) {
            return self.flush();
        }

        let mut target = self.store.get(session_id)?;

        self.flush()?;

        let created = ensure_initial_topic(&mut target.graph)?;
        if created.is_some() {
            self.store.put(&target)?;
        }

        tracing::info!(session_id = %target.id, name = %target.name, "Switched session");
        self.active = Some(target);

        if let Err(e) = self.app_state.set_last_active_session_id(session_id) {
            tracing::warn!(error = %e, "Could not record last active session");
        }
        Ok(())
    }

    /// Writes the working copy to the store.
    pub fn flush(&self) -> Result<()> {
        match &self.active {
            Some(session) => self.store.put(session),
            None => Ok(()),
        }
    }

    /// Runs a mutation on the working copy and writes it through.
    ///
    /// `f` must leave the session untouched when it returns an error; nothing
    /// is written in that case. When the write fails the working copy keeps
    /// the change and is written again by the next flush.
    pub fn with_active<R>(&mut self, f: impl FnOnce(&mut Session) -> Result<R>) -> Result<R> {
        let session = self
            .active
            .as_mut()
            .ok_or_else(|| TopicGraphError::not_found("session", "<active>"))?;
        let value = f(session)?;
        if let Err(e) = self.store.put(session) {
            tracing::warn!(session_id = %session.id, error = %e, "Write-through failed");
            return Err(e);
        }
        Ok(value)
    }

    /// Mutates the working copy without writing it through.
    ///
    /// For advisory data (layout hints) that is persisted by the next flush.
    pub fn with_active_unsaved<R>(&mut self, f: impl FnOnce(&mut Session) -> R) -> Result<R> {
        self.active
            .as_mut()
            .map(f)
            .ok_or_else(|| TopicGraphError::not_found("session", "<active>"))
    }

    /// Appends a message to a topic of any session.
    ///
    /// The active session goes through the working copy; any other session
    /// is updated in the store directly.
    pub fn append_to_session(
        &mut self,
        session_id: &str,
        topic_id: &str,
        sender: Sender,
        content: &str,
    ) -> Result<Message> {
        if self.active_id() == Some(session_id) {
            return self.with_active(|s| {
                s.message_log.append(&mut s.graph, topic_id, sender, content)
            });
        }

        let mut stored = self.store.get(session_id)?;
        let message = stored
            .message_log
            .append(&mut stored.graph, topic_id, sender, content)?;
        self.store.put(&stored)?;
        Ok(message)
    }

    /// Removes a session. The last session is replaced by a fresh default one;
    /// deleting the active session switches to the oldest remaining one.
    pub fn delete_session(&mut self, session_id: &str, prompter: &dyn Prompter) -> Result<()> {
        if let Err(e) = self.store.get(session_id) {
            if e.is_not_found() {
                return Err(e);
            }
        }

        let was_active = self.active_id() == Some(session_id);
        self.store.remove(session_id)?;
        // The deleted session must not be flushed back by the switch below.
        if was_active {
            self.active = None;
        }
        tracing::info!(session_id = %session_id, "Deleted session");

        let remaining = self.store.list_all()?;
        match remaining.first() {
            None => {
                self.create_session(Some(DEFAULT_SESSION_NAME), prompter)?;
            }
            Some(first) if was_active => {
                let first_id = first.id.clone();
                self.switch_to(&first_id)?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Flips the favorite flag, returning the new value.
    pub fn toggle_favorite(&mut self, session_id: &str) -> Result<bool> {
        self.update_metadata(session_id, |s| {
            s.is_favorite = !s.is_favorite;
            Ok(s.is_favorite)
        })
    }

    /// Renames a session. Blank or unchanged names return `false`.
    pub fn rename_session(&mut self, session_id: &str, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim().to_string();
        self.update_metadata(session_id, move |s| {
            if new_name.is_empty() || new_name == s.name {
                return Ok(false);
            }
            s.name = new_name;
            Ok(true)
        })
    }

    /// Session-level metadata lives in the stored snapshot; the working copy
    /// is updated alongside so a later flush keeps the change.
    fn update_metadata<R>(
        &mut self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> Result<R>,
    ) -> Result<R> {
        if self.active_id() == Some(session_id) {
            return self.with_active(f);
        }
        let mut stored = self.store.get(session_id)?;
        let value = f(&mut stored)?;
        self.store.put(&stored)?;
        Ok(value)
    }

    /// Every session, oldest first, with the working copy standing in for
    /// its stored snapshot.
    pub fn sessions(&self) -> Result<Vec<SessionSummary>> {
        Ok(self
            .store
            .list_all()?
            .into_iter()
            .map(|stored| match &self.active {
                Some(active) if active.id == stored.id => active.summary(),
                _ => stored.summary(),
            })
            .collect())
    }

    pub fn search_sessions(&self, term: &str) -> Result<Vec<SessionSummary>> {
        Ok(search_sessions(&self.sessions()?, term))
    }

    pub fn favorite_sessions(&self, term: &str) -> Result<Vec<SessionSummary>> {
        Ok(favorite_sessions(&self.sessions()?, term))
    }
}
