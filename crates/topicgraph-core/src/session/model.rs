//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::{Graph, RestoreReport};
use crate::message_log::MessageLog;
use crate::topic::{Link, Topic};

/// Name of the session created on a cold start with no stored sessions.
pub const DEFAULT_SESSION_NAME: &str = "New Session";

/// An isolated conversation workspace with its own topic graph.
///
/// This is the storage-independent model; the versioned on-disk shapes live
/// in the infrastructure layer and convert into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Time-ordered unique id (UUID v7)
    pub id: String,
    pub name: String,
    pub graph: Graph,
    pub message_log: MessageLog,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
}

impl Session {
    /// A new, empty, non-favorite session.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            graph: Graph::new(),
            message_log: MessageLog::new(),
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    /// Rebuilds a session from persisted parts.
    ///
    /// The graph is repaired by [`Graph::restore`] and the message counter is
    /// raised to the highest stored message id.
    pub fn restore(
        id: String,
        name: String,
        graph: Graph,
        message_counter: u64,
        created_at: DateTime<Utc>,
        is_favorite: bool,
    ) -> Self {
        let message_log = MessageLog::restore(message_counter, &graph);
        Self {
            id,
            name,
            graph,
            message_log,
            created_at,
            is_favorite,
        }
    }

    /// Like [`Session::restore`], starting from raw graph parts.
    #[allow(clippy::too_many_arguments)]
    pub fn restore_from_parts(
        id: String,
        name: String,
        topics: Vec<Topic>,
        links: Vec<Link>,
        current_topic_id: Option<String>,
        message_counter: u64,
        created_at: DateTime<Utc>,
        is_favorite: bool,
    ) -> (Self, RestoreReport) {
        let (graph, report) = Graph::restore(topics, links, current_topic_id);
        (
            Self::restore(id, name, graph, message_counter, created_at, is_favorite),
            report,
        )
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            topic_count: self.graph.topic_count(),
            created_at: self.created_at,
            is_favorite: self.is_favorite,
        }
    }
}

/// What the session list shows for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub topic_count: usize,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
}
