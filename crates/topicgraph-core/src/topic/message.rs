//! Message types.
//!
//! Messages are immutable once created. They are appended to a topic's log,
//! or (navigation messages only) inserted near its head.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the user.
    User,
    /// Reply from the language model.
    Assistant,
    /// Banner or notice produced by the engine ("Started new topic: ...").
    System,
    /// Synthetic "continue from" link back to a parent topic.
    Navigation,
}

/// The parent topic a navigation message points back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLink {
    pub parent_topic_id: String,
    pub parent_topic_name: String,
}

/// A single entry in a topic's message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Session-wide, strictly increasing id.
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Present only for `Sender::Navigation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationLink>,
}

impl Message {
    pub(crate) fn new(id: u64, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            content: content.into(),
            timestamp: Utc::now(),
            navigation: None,
        }
    }

    pub(crate) fn navigation(id: u64, parent_topic_id: &str, parent_topic_name: &str) -> Self {
        Self {
            id,
            sender: Sender::Navigation,
            content: format!("Continue from: {}", parent_topic_name),
            timestamp: Utc::now(),
            navigation: Some(NavigationLink {
                parent_topic_id: parent_topic_id.to_string(),
                parent_topic_name: parent_topic_name.to_string(),
            }),
        }
    }

    pub fn is_navigation_link(&self) -> bool {
        self.sender == Sender::Navigation && self.navigation.is_some()
    }

    pub fn linked_parent_topic_id(&self) -> Option<&str> {
        self.navigation.as_ref().map(|n| n.parent_topic_id.as_str())
    }

    pub fn linked_parent_topic_name(&self) -> Option<&str> {
        self.navigation.as_ref().map(|n| n.parent_topic_name.as_str())
    }
}

/// Role of a history entry handed to the assistant collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            _ => Role::Assistant,
        }
    }
}

/// One `{role, content}` pair of conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}
