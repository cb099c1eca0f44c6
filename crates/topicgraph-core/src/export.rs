//! JSON export documents for a whole session or a single topic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::geometry::Point;
use crate::graph::Graph;
use crate::topic::{Link, Message, Sender, Topic};

/// A message in its exported form, with the navigation link flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMessage {
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_navigation_link: bool,
    pub linked_parent_topic_id: Option<String>,
    pub linked_parent_topic_name: Option<String>,
}

impl From<&Message> for ExportedMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            content: message.content.clone(),
            timestamp: message.timestamp,
            is_navigation_link: message.is_navigation_link(),
            linked_parent_topic_id: message.linked_parent_topic_id().map(str::to_string),
            linked_parent_topic_name: message.linked_parent_topic_name().map(str::to_string),
        }
    }
}

/// A graph node in its exported form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTopic {
    pub id: String,
    pub title: String,
    pub messages: Vec<ExportedMessage>,
    pub message_count: usize,
    pub position: Point,
    pub parent_topic_id: Option<String>,
    pub parent_topic_name: Option<String>,
}

impl From<&Topic> for ExportedTopic {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id().to_string(),
            title: topic.title().to_string(),
            messages: export_messages(topic),
            message_count: topic.message_count(),
            position: topic.position,
            parent_topic_id: topic.parent_topic_id().map(str::to_string),
            parent_topic_name: topic.parent_topic_name().map(str::to_string),
        }
    }
}

fn export_messages(topic: &Topic) -> Vec<ExportedMessage> {
    topic.messages().iter().map(ExportedMessage::from).collect()
}

/// A whole session graph as downloaded by the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub nodes: Vec<ExportedTopic>,
    pub links: Vec<Link>,
    pub export_date: DateTime<Utc>,
}

/// One topic and its messages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicExport {
    pub topic: String,
    pub messages: Vec<ExportedMessage>,
    pub message_count: usize,
    pub parent_topic: Option<String>,
    pub export_date: DateTime<Utc>,
}

impl SessionExport {
    pub fn new(graph: &Graph, export_date: DateTime<Utc>) -> Self {
        Self {
            nodes: graph.topics().iter().map(ExportedTopic::from).collect(),
            links: graph.links().to_vec(),
            export_date,
        }
    }

    /// `chatgraph-{YYYY-MM-DD}.json`
    pub fn file_name(&self) -> String {
        format!("chatgraph-{}.json", self.export_date.date_naive())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TopicExport {
    pub fn new(topic: &Topic, export_date: DateTime<Utc>) -> Self {
        Self {
            topic: topic.title().to_string(),
            messages: export_messages(topic),
            message_count: topic.message_count(),
            parent_topic: topic.parent_topic_name().map(str::to_string),
            export_date,
        }
    }

    /// `topic-{sanitized title}-{YYYY-MM-DD}.json`
    pub fn file_name(&self) -> String {
        topic_file_name(&self.topic, self.export_date.date_naive())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn topic_file_name(title: &str, date: NaiveDate) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("topic-{}-{}.json", sanitized, date)
}
