//! The top-level controller: owns the application state and runs every
//! user-facing operation against it.

use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use topicgraph_core::branching::{branch_from_current, branch_from_selection};
use topicgraph_core::config::{AppConfig, DEFAULT_HISTORY_WINDOW};
use topicgraph_core::export::{SessionExport, TopicExport};
use topicgraph_core::geometry::{LinkAnchors, Point};
use topicgraph_core::graph::LayoutSnapshot;
use topicgraph_core::message_log::history;
use topicgraph_core::reply::ReplyRequest;
use topicgraph_core::session::{Session, SessionSummary};
use topicgraph_core::settings::{Settings, SettingsRepository};
use topicgraph_core::suggestion::{SUGGESTION_PROBABILITY, suggest_branch_with};
use topicgraph_core::topic::{HistoryEntry, Link, Message, Sender, Topic};
use topicgraph_core::{Prompter, Result, TopicGraphError};
use topicgraph_interaction::{AssistantReplier, ReplyError};

use crate::session_manager::SessionManager;

pub const MISSING_API_KEY_MESSAGE: &str =
    "Please set your OpenAI API key in settings to use AI responses.";
pub const SETTINGS_SAVED_MESSAGE: &str = "Settings saved successfully!";

/// Knobs for [`ChatController`] that do not come from stored settings.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Messages of cross-topic history sent with each request
    pub history_window: usize,
    /// Used when the stored api key is empty (e.g. `OPENAI_API_KEY`)
    pub fallback_api_key: Option<String>,
    pub suggestion_probability: f64,
    /// Fixed seed for branch suggestions; entropy when `None`
    pub rng_seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            fallback_api_key: None,
            suggestion_probability: SUGGESTION_PROBABILITY,
            rng_seed: None,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            history_window: config.history_window,
            ..Self::default()
        }
    }
}

/// Everything needed to finish a send after the reply arrives.
///
/// The reply lands in the topic that was current when the send began, even
/// if the user has moved elsewhere since.
#[derive(Debug, Clone)]
pub struct ReplyTicket {
    pub session_id: String,
    pub topic_id: String,
    pub user_message: String,
    pub api_key: String,
    pub request: ReplyRequest,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input
    Ignored,
    /// No api key: the user message and a hint were recorded, nothing was sent
    MissingApiKey(Message),
    /// A request should be sent; finish with [`ChatController::complete_send`]
    Pending(ReplyTicket),
}

#[derive(Debug, Clone)]
pub struct CompletedReply {
    /// The assistant reply, or the `Error: ...` system message
    pub message: Message,
    /// Topic created from an accepted branch suggestion
    pub branched: Option<Topic>,
}

/// Owns the application state: the session manager with its working copy,
/// the active settings and the in-flight send guard.
pub struct ChatController {
    sessions: SessionManager,
    settings_repo: Arc<dyn SettingsRepository>,
    replier: Arc<dyn AssistantReplier>,
    prompter: Arc<dyn Prompter>,
    settings: Settings,
    options: ControllerOptions,
    rng: StdRng,
    in_flight: bool,
}

impl ChatController {
    /// Loads settings and performs the cold-start session selection.
    pub fn new(
        mut sessions: SessionManager,
        settings_repo: Arc<dyn SettingsRepository>,
        replier: Arc<dyn AssistantReplier>,
        prompter: Arc<dyn Prompter>,
        options: ControllerOptions,
    ) -> Result<Self> {
        let settings = settings_repo
            .load()?
            .with_fallback_api_key(options.fallback_api_key.clone());
        sessions.startup(prompter.as_ref())?;

        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            sessions,
            settings_repo,
            replier,
            prompter,
            settings,
            options,
            rng,
            in_flight: false,
        })
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.active()
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.sessions.active().and_then(|s| s.graph.current_topic())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    /// The context window the next request would carry.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.sessions
            .active()
            .map(|s| history(&s.graph, self.options.history_window))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------------

    pub fn sessions(&self) -> Result<Vec<SessionSummary>> {
        self.sessions.sessions()
    }

    pub fn search_sessions(&self, term: &str) -> Result<Vec<SessionSummary>> {
        self.sessions.search_sessions(term)
    }

    pub fn favorite_sessions(&self, term: &str) -> Result<Vec<SessionSummary>> {
        self.sessions.favorite_sessions(term)
    }

    pub fn create_session(&mut self, name: Option<&str>) -> Result<SessionSummary> {
        self.sessions.create_session(name, self.prompter.as_ref())
    }

    pub fn switch_session(&mut self, session_id: &str) -> Result<()> {
        self.sessions.switch_to(session_id)
    }

    pub fn delete_session(&mut self, session_id: &str) -> Result<()> {
        self.sessions.delete_session(session_id, self.prompter.as_ref())
    }

    pub fn toggle_favorite(&mut self, session_id: &str) -> Result<bool> {
        self.sessions.toggle_favorite(session_id)
    }

    pub fn rename_session(&mut self, session_id: &str, new_name: &str) -> Result<bool> {
        self.sessions.rename_session(session_id, new_name)
    }

    // ------------------------------------------------------------------------
    // Topics
    // ------------------------------------------------------------------------

    /// Branches from the current topic; see [`branch_from_current`].
    pub fn new_topic(&mut self, title: Option<&str>) -> Result<Topic> {
        let prompter = self.prompter.clone();
        self.sessions.with_active(|s| {
            branch_from_current(&mut s.graph, &mut s.message_log, title, None, prompter.as_ref())
        })
    }

    pub fn branch_from_selection(&mut self, selected_text: &str) -> Result<Topic> {
        let prompter = self.prompter.clone();
        self.sessions.with_active(|s| {
            branch_from_selection(
                &mut s.graph,
                &mut s.message_log,
                selected_text,
                prompter.as_ref(),
            )
        })
    }

    pub fn select_topic(&mut self, topic_id: &str) -> Result<Topic> {
        self.sessions
            .with_active(|s| s.graph.select_topic(topic_id).cloned())
    }

    /// Selects the parent a navigation message in the current topic points to.
    pub fn follow_navigation(&mut self, message_id: u64) -> Result<Topic> {
        let parent_id = self
            .current_topic()
            .ok_or_else(|| TopicGraphError::not_found("topic", "<current>"))?
            .find_message(message_id)
            .ok_or_else(|| TopicGraphError::not_found("message", message_id.to_string()))?
            .linked_parent_topic_id()
            .map(str::to_string)
            .ok_or_else(|| TopicGraphError::validation("not a navigation message"))?;
        self.select_topic(&parent_id)
    }

    pub fn rename_topic(&mut self, topic_id: &str, new_title: &str) -> Result<bool> {
        self.sessions
            .with_active(|s| s.graph.rename_topic(topic_id, new_title))
    }

    pub fn delete_topic(&mut self, topic_id: &str) -> Result<Topic> {
        self.sessions.with_active(|s| s.graph.delete_topic(topic_id))
    }

    // ------------------------------------------------------------------------
    // Layout hand-off
    // ------------------------------------------------------------------------

    pub fn layout_snapshot(&self) -> Option<LayoutSnapshot> {
        self.sessions.active().map(|s| s.graph.layout_snapshot())
    }

    /// Stores positions from a layout tick; persisted with the next write.
    pub fn apply_layout_tick(&mut self, positions: &[(String, Point)]) -> Result<usize> {
        self.sessions.with_active_unsaved(|s| {
            s.graph
                .apply_layout_tick(positions.iter().map(|(id, p)| (id.as_str(), *p)))
        })
    }

    pub fn link_anchors(&self) -> Vec<(Link, LinkAnchors)> {
        self.sessions
            .active()
            .map(|s| s.graph.link_anchors())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Assistant round trip
    // ------------------------------------------------------------------------

    /// Records the user message and prepares the request.
    ///
    /// History is captured before the user message is appended, so the
    /// request carries the new message exactly once. Only one send may be
    /// outstanding at a time.
    pub fn begin_send(&mut self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.in_flight {
            return Err(TopicGraphError::guard("a reply is already pending"));
        }

        let session = self
            .sessions
            .active()
            .ok_or_else(|| TopicGraphError::not_found("session", "<active>"))?;
        let topic = session
            .graph
            .current_topic()
            .ok_or_else(|| TopicGraphError::not_found("topic", "<current>"))?;

        let session_id = session.id.clone();
        let topic_id = topic.id().to_string();
        let request = ReplyRequest::new(
            Some(&session.name),
            Some(topic.title()),
            history(&session.graph, self.options.history_window),
            text,
            &self.settings,
        );

        self.sessions
            .append_to_session(&session_id, &topic_id, Sender::User, text)?;

        if !self.settings.has_api_key() {
            let hint = self.sessions.append_to_session(
                &session_id,
                &topic_id,
                Sender::System,
                MISSING_API_KEY_MESSAGE,
            )?;
            return Ok(SendOutcome::MissingApiKey(hint));
        }

        self.in_flight = true;
        Ok(SendOutcome::Pending(ReplyTicket {
            session_id,
            topic_id,
            user_message: text.to_string(),
            api_key: self.settings.api_key.clone(),
            request,
        }))
    }

    /// Records the outcome of a send in the topic captured by `ticket`.
    ///
    /// Failures become a visible `Error: ...` system message. After a
    /// successful reply in the still-active session a branch may be offered.
    pub fn complete_send(
        &mut self,
        ticket: ReplyTicket,
        result: std::result::Result<String, ReplyError>,
    ) -> Result<CompletedReply> {
        self.in_flight = false;

        let succeeded = result.is_ok();
        let (sender, content) = match result {
            Ok(reply) => (Sender::Assistant, reply),
            Err(e) => {
                tracing::warn!(error = %e, "Assistant reply failed");
                (Sender::System, format!("Error: {}", e))
            }
        };
        let message = self.sessions.append_to_session(
            &ticket.session_id,
            &ticket.topic_id,
            sender,
            &content,
        )?;

        let still_active = self.sessions.active_id() == Some(ticket.session_id.as_str());
        let branched = if succeeded && still_active {
            self.offer_branch(&ticket.user_message)?
        } else {
            None
        };

        Ok(CompletedReply { message, branched })
    }

    /// `begin_send`, the request, then `complete_send`.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<CompletedReply>> {
        let ticket = match self.begin_send(text)? {
            SendOutcome::Pending(ticket) => ticket,
            SendOutcome::Ignored | SendOutcome::MissingApiKey(_) => return Ok(None),
        };

        let result = self.fetch_reply(&ticket).await;
        self.complete_send(ticket, result).map(Some)
    }

    /// Performs the request for a pending send without touching state.
    pub async fn fetch_reply(&self, ticket: &ReplyTicket) -> std::result::Result<String, ReplyError> {
        self.replier.reply(&ticket.api_key, &ticket.request).await
    }

    fn offer_branch(&mut self, user_message: &str) -> Result<Option<Topic>> {
        let Some(title) = suggest_branch_with(
            user_message,
            self.options.suggestion_probability,
            &mut self.rng,
        ) else {
            return Ok(None);
        };

        if !self.prompter.confirm_branch(title) {
            tracing::debug!(title, "Branch suggestion declined");
            return Ok(None);
        }
        self.new_topic(Some(title)).map(Some)
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn save_settings(&mut self, mut settings: Settings) -> Result<()> {
        settings.api_key = settings.api_key.trim().to_string();
        self.settings_repo.save(&settings)?;
        self.settings = settings;
        self.append_system_to_current(SETTINGS_SAVED_MESSAGE)?;
        Ok(())
    }

    /// Checks an api key with a minimal request.
    pub async fn test_api(&self, api_key: &str) -> std::result::Result<(), ReplyError> {
        self.replier.test_api(api_key).await
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    pub fn export_session(&self) -> Result<SessionExport> {
        let session = self
            .sessions
            .active()
            .ok_or_else(|| TopicGraphError::not_found("session", "<active>"))?;
        Ok(SessionExport::new(&session.graph, Utc::now()))
    }

    /// Exports one topic and notes the export in the current topic.
    pub fn export_topic(&mut self, topic_id: &str) -> Result<TopicExport> {
        let export = self
            .sessions
            .active()
            .and_then(|s| s.graph.find_topic(topic_id))
            .map(|topic| TopicExport::new(topic, Utc::now()))
            .ok_or_else(|| TopicGraphError::not_found("topic", topic_id))?;

        self.append_system_to_current(&format!(
            "Topic \"{}\" exported successfully.",
            export.topic
        ))?;
        Ok(export)
    }

    fn append_system_to_current(&mut self, content: &str) -> Result<Option<Message>> {
        let Some(topic_id) = self.current_topic().map(|t| t.id().to_string()) else {
            return Ok(None);
        };
        self.sessions
            .with_active(|s| {
                s.message_log
                    .append(&mut s.graph, &topic_id, Sender::System, content)
            })
            .map(Some)
    }
}
