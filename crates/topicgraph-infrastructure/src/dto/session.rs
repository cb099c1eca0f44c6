//! Session DTOs and migrations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Migrator, Versioned};

use topicgraph_core::Result;
use topicgraph_core::geometry::Point;
use topicgraph_core::session::Session;
use topicgraph_core::topic::{Link, Message, NavigationLink, Sender, Topic};

// ============================================================================
// V1.0.0: the legacy browser shape
// ============================================================================

/// Sender tags of the legacy shape, where assistant replies were `"ai"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderV1_0_0 {
    User,
    #[serde(alias = "assistant")]
    Ai,
    System,
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV1_0_0 {
    pub id: u64,
    pub sender: SenderV1_0_0,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_navigation_link: bool,
    #[serde(default)]
    pub parent_topic_id: Option<String>,
    #[serde(default)]
    pub parent_topic_name: Option<String>,
}

/// A graph node; the layout engine adds more fields, which are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeV1_0_0 {
    pub id: String,
    /// The node title
    pub topic: String,
    #[serde(default)]
    pub messages: Vec<MessageV1_0_0>,
    /// Stored count; recomputed on load
    #[serde(default)]
    pub message_count: usize,
    /// Missing, or `null` when the layout produced NaN
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub parent_topic_id: Option<String>,
    #[serde(default)]
    pub parent_topic_name: Option<String>,
}

/// A link end: a bare id, or the node object the layout engine swapped in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEndpointV1_0_0 {
    Id(String),
    Node { id: String },
}

impl LinkEndpointV1_0_0 {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Node { id } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkV1_0_0 {
    pub source: LinkEndpointV1_0_0,
    pub target: LinkEndpointV1_0_0,
}

/// Represents V1.0.0 of the session data schema.
/// Stored without a `version` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_0_0 {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeV1_0_0>,
    #[serde(default)]
    pub links: Vec<LinkV1_0_0>,
    #[serde(default)]
    pub current_topic_id: Option<String>,
    /// The session-wide message id counter
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
}

// ============================================================================
// V1.1.0: current shape
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV1_1_0 {
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_navigation_link: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_parent_topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_parent_topic_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicV1_1_0 {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageV1_1_0>,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub parent_topic_id: Option<String>,
    #[serde(default)]
    pub parent_topic_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkV1_1_0 {
    pub source: String,
    pub target: String,
}

/// Represents V1.1.0 of the session data schema.
/// Renamed `nodes` to `topics`, node `topic` to `title`, sender `ai` to
/// `assistant` and the counter `messageCount` to `messageCounter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_1_0 {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<TopicV1_1_0>,
    #[serde(default)]
    pub links: Vec<LinkV1_1_0>,
    #[serde(default)]
    pub current_topic_id: Option<String>,
    #[serde(default)]
    pub message_counter: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Migration from V1.0.0 to V1.1.0.
///
/// Messages without a timestamp take the session's creation time.
impl MigratesTo<SessionV1_1_0> for SessionV1_0_0 {
    fn migrate(self) -> SessionV1_1_0 {
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        let topics = self
            .nodes
            .into_iter()
            .map(|node| TopicV1_1_0 {
                id: node.id,
                title: node.topic,
                message_count: node.messages.len(),
                messages: node
                    .messages
                    .into_iter()
                    .map(|m| migrate_message(m, created_at))
                    .collect(),
                x: node.x.filter(|v| v.is_finite()).unwrap_or_default(),
                y: node.y.filter(|v| v.is_finite()).unwrap_or_default(),
                parent_topic_id: node.parent_topic_id,
                parent_topic_name: node.parent_topic_name,
            })
            .collect();

        let links = self
            .links
            .into_iter()
            .map(|l| LinkV1_1_0 {
                source: l.source.into_id(),
                target: l.target.into_id(),
            })
            .collect();

        SessionV1_1_0 {
            id: self.id,
            name: self.name,
            topics,
            links,
            current_topic_id: self.current_topic_id,
            message_counter: self.message_count,
            created_at,
            is_favorite: self.is_favorite,
        }
    }
}

fn migrate_message(m: MessageV1_0_0, fallback_time: DateTime<Utc>) -> MessageV1_1_0 {
    let sender = match m.sender {
        SenderV1_0_0::User => Sender::User,
        SenderV1_0_0::Ai => Sender::Assistant,
        SenderV1_0_0::System => Sender::System,
        SenderV1_0_0::Navigation => Sender::Navigation,
    };
    MessageV1_1_0 {
        id: m.id,
        sender,
        content: m.content,
        timestamp: m.timestamp.unwrap_or(fallback_time),
        is_navigation_link: m.is_navigation_link,
        linked_parent_topic_id: m.parent_topic_id,
        linked_parent_topic_name: m.parent_topic_name,
    }
}

/// Convert DTO to domain model, repairing what the graph invariants forbid.
impl IntoDomain<Session> for SessionV1_1_0 {
    fn into_domain(self) -> Session {
        let topics = self
            .topics
            .into_iter()
            .map(|t| {
                let messages = t.messages.into_iter().map(message_into_domain).collect();
                Topic::restore(
                    t.id,
                    t.title,
                    messages,
                    Point::new(t.x, t.y),
                    t.parent_topic_id,
                    t.parent_topic_name,
                )
            })
            .collect();
        let links = self
            .links
            .into_iter()
            .map(|l| Link::new(l.source, l.target))
            .collect();

        let (session, report) = Session::restore_from_parts(
            self.id,
            self.name,
            topics,
            links,
            self.current_topic_id,
            self.message_counter,
            self.created_at,
            self.is_favorite,
        );

        if !report.is_clean() {
            tracing::warn!(
                session_id = %session.id,
                duplicate_topics = report.duplicate_topics,
                dropped_links = report.dropped_links,
                current_repaired = report.current_repaired,
                "Repaired stored session"
            );
        }
        session
    }
}

fn message_into_domain(m: MessageV1_1_0) -> Message {
    let navigation = match (m.sender, m.linked_parent_topic_id) {
        (Sender::Navigation, Some(parent_topic_id)) => Some(NavigationLink {
            parent_topic_id,
            parent_topic_name: m.linked_parent_topic_name.unwrap_or_default(),
        }),
        _ => None,
    };
    Message {
        id: m.id,
        sender: m.sender,
        content: m.content,
        timestamp: m.timestamp,
        navigation,
    }
}

/// Convert domain model to the V1.1.0 DTO for persistence.
impl FromDomain<Session> for SessionV1_1_0 {
    fn from_domain(session: Session) -> Self {
        let Session {
            id,
            name,
            graph,
            message_log,
            created_at,
            is_favorite,
        } = session;

        let topics = graph
            .topics()
            .iter()
            .map(|t| TopicV1_1_0 {
                id: t.id().to_string(),
                title: t.title().to_string(),
                messages: t.messages().iter().map(message_from_domain).collect(),
                message_count: t.message_count(),
                x: t.position.x,
                y: t.position.y,
                parent_topic_id: t.parent_topic_id().map(str::to_string),
                parent_topic_name: t.parent_topic_name().map(str::to_string),
            })
            .collect();
        let links = graph
            .links()
            .iter()
            .map(|l| LinkV1_1_0 {
                source: l.source.clone(),
                target: l.target.clone(),
            })
            .collect();

        SessionV1_1_0 {
            id,
            name,
            topics,
            links,
            current_topic_id: graph.current_topic_id().map(str::to_string),
            message_counter: message_log.message_counter(),
            created_at,
            is_favorite,
        }
    }
}

fn message_from_domain(m: &Message) -> MessageV1_1_0 {
    MessageV1_1_0 {
        id: m.id,
        sender: m.sender,
        content: m.content.clone(),
        timestamp: m.timestamp,
        is_navigation_link: m.is_navigation_link(),
        linked_parent_topic_id: m.linked_parent_topic_id().map(str::to_string),
        linked_parent_topic_name: m.linked_parent_topic_name().map(str::to_string),
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for Session entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Renames the legacy browser fields, flattens link endpoints
/// - V1.1.0 → Session: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_session_migrator()?;
/// let session: Session = migrator.load_flat_from("session", json_value)?;
/// ```
pub fn create_session_migrator() -> Result<Migrator> {
    let mut migrator = Migrator::builder().build();

    let session_path = Migrator::define("session")
        .from::<SessionV1_0_0>()
        .step::<SessionV1_1_0>()
        .into_with_save::<Session>();

    migrator.register(session_path)?;
    Ok(migrator)
}
