//! Topic (graph node) and link records.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::geometry::Point;

/// Half-range of the random jitter applied to a new topic's layout hint.
pub const POSITION_JITTER: f64 = 100.0;

/// A node in a session's topic graph, owning its own linear message log.
///
/// `message_count` always equals `messages.len()`; the log is only mutated
/// through [`crate::message_log::MessageLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) messages: Vec<Message>,
    pub(crate) message_count: usize,
    /// Advisory layout hint, owned by the layout collaborator.
    pub position: Point,
    pub(crate) parent_topic_id: Option<String>,
    pub(crate) parent_topic_name: Option<String>,
}

impl Topic {
    pub(crate) fn new(
        id: String,
        title: String,
        parent: Option<(&str, &str)>,
        position: Point,
    ) -> Self {
        Self {
            id,
            title,
            messages: Vec::new(),
            message_count: 0,
            position,
            parent_topic_id: parent.map(|(id, _)| id.to_string()),
            parent_topic_name: parent.map(|(_, name)| name.to_string()),
        }
    }

    /// Rebuilds a topic from persisted parts, recomputing the message count.
    pub fn restore(
        id: String,
        title: String,
        messages: Vec<Message>,
        position: Point,
        parent_topic_id: Option<String>,
        parent_topic_name: Option<String>,
    ) -> Self {
        let message_count = messages.len();
        Self {
            id,
            title,
            messages,
            message_count,
            position,
            parent_topic_id,
            parent_topic_name,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn parent_topic_id(&self) -> Option<&str> {
        self.parent_topic_id.as_deref()
    }

    pub fn parent_topic_name(&self) -> Option<&str> {
        self.parent_topic_name.as_deref()
    }

    pub fn find_message(&self, message_id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.message_count += 1;
    }

    pub(crate) fn insert_message(&mut self, index: usize, message: Message) {
        self.messages.insert(index, message);
        self.message_count += 1;
    }
}

/// A directed `source -> target` edge, created when a topic branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, topic_id: &str) -> bool {
        self.source == topic_id || self.target == topic_id
    }
}

/// A layout hint near the origin with jitter in `±POSITION_JITTER` on each axis.
pub fn jittered_origin<R: Rng + ?Sized>(rng: &mut R) -> Point {
    Point {
        x: rng.gen_range(-POSITION_JITTER..POSITION_JITTER),
        y: rng.gen_range(-POSITION_JITTER..POSITION_JITTER),
    }
}
