//! Per-topic message logs and the session-wide message id counter.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicGraphError};
use crate::graph::Graph;
use crate::topic::{HistoryEntry, Message, Sender};

/// Issues message ids and writes messages into a graph's topics.
///
/// The counter is per session and only ever grows, so ids are never reused,
/// not even after the topic holding them is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageLog {
    message_counter: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a counter, raising it to the highest id present in `graph`.
    pub fn restore(message_counter: u64, graph: &Graph) -> Self {
        let highest = graph
            .topics()
            .iter()
            .flat_map(|t| t.messages())
            .map(|m| m.id)
            .max()
            .unwrap_or(0);
        Self {
            message_counter: message_counter.max(highest),
        }
    }

    /// The last id handed out (0 before the first message).
    pub fn message_counter(&self) -> u64 {
        self.message_counter
    }

    fn next_id(&mut self) -> u64 {
        self.message_counter += 1;
        self.message_counter
    }

    /// Appends a user, assistant or system message to the end of a topic's log.
    pub fn append(
        &mut self,
        graph: &mut Graph,
        topic_id: &str,
        sender: Sender,
        content: impl Into<String>,
    ) -> Result<Message> {
        if sender == Sender::Navigation {
            return Err(TopicGraphError::validation(
                "navigation messages are inserted with insert_navigation_message",
            ));
        }
        let topic = graph
            .find_topic_mut(topic_id)
            .ok_or_else(|| TopicGraphError::not_found("topic", topic_id))?;

        let message = Message::new(self.next_id(), sender, content);
        topic.push_message(message.clone());
        Ok(message)
    }

    /// Inserts a "Continue from: {parent}" message into a topic.
    ///
    /// Goes directly after the first system message when one exists, so an
    /// introductory banner stays above the link; otherwise at the head.
    pub fn insert_navigation_message(
        &mut self,
        graph: &mut Graph,
        topic_id: &str,
        parent_topic_id: &str,
    ) -> Result<Message> {
        let parent_title = graph
            .find_topic(parent_topic_id)
            .map(|p| p.title().to_string())
            .ok_or_else(|| TopicGraphError::not_found("topic", parent_topic_id))?;
        if graph.find_topic(topic_id).is_none() {
            return Err(TopicGraphError::not_found("topic", topic_id));
        }

        let message = Message::navigation(self.next_id(), parent_topic_id, &parent_title);
        let topic = graph
            .find_topic_mut(topic_id)
            .ok_or_else(|| TopicGraphError::not_found("topic", topic_id))?;

        let index = topic
            .messages()
            .iter()
            .position(|m| m.sender == Sender::System)
            .map_or(0, |i| i + 1);
        topic.insert_message(index, message.clone());
        Ok(message)
    }
}

/// Conversation context for the assistant, across every topic of a session.
///
/// System messages are excluded. The rest are ordered by timestamp (ties by
/// id), only the last `max_messages` are kept, and senders other than the
/// user are reported as the assistant.
pub fn history(graph: &Graph, max_messages: usize) -> Vec<HistoryEntry> {
    let mut messages: Vec<&Message> = graph
        .topics()
        .iter()
        .flat_map(|t| t.messages())
        .filter(|m| m.sender != Sender::System)
        .collect();

    messages.sort_by_key(|m| (m.timestamp, m.id));

    let skip = messages.len().saturating_sub(max_messages);
    messages
        .into_iter()
        .skip(skip)
        .map(|m| HistoryEntry {
            role: m.sender.into(),
            content: m.content.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Role;

    fn setup() -> (Graph, MessageLog, String, String) {
        let mut graph = Graph::new();
        let a = graph.create_topic("A", None).unwrap().id().to_string();
        let b = graph.create_topic("B", Some(&a)).unwrap().id().to_string();
        (graph, MessageLog::new(), a, b)
    }

    #[test]
    fn test_append_assigns_increasing_ids_and_counts() {
        let (mut graph, mut log, a, _) = setup();
        let m1 = log.append(&mut graph, &a, Sender::User, "hello").unwrap();
        let m2 = log.append(&mut graph, &a, Sender::Assistant, "hi").unwrap();
        assert!(m2.id > m1.id);

        let topic = graph.find_topic(&a).unwrap();
        assert_eq!(topic.message_count(), 2);
        assert_eq!(topic.messages().len(), 2);
        assert_eq!(log.message_counter(), 2);
    }

    #[test]
    fn test_append_to_unknown_topic_consumes_no_id() {
        let (mut graph, mut log, _, _) = setup();
        assert!(log.append(&mut graph, "missing", Sender::User, "x").unwrap_err().is_not_found());
        assert_eq!(log.message_counter(), 0);
    }

    #[test]
    fn test_append_rejects_navigation_sender() {
        let (mut graph, mut log, a, _) = setup();
        let err = log.append(&mut graph, &a, Sender::Navigation, "x").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_navigation_goes_after_first_system_message() {
        let (mut graph, mut log, a, b) = setup();
        log.append(&mut graph, &b, Sender::System, "Started new topic: B").unwrap();
        log.append(&mut graph, &b, Sender::User, "question").unwrap();
        log.append(&mut graph, &b, Sender::System, "second banner").unwrap();

        let nav = log.insert_navigation_message(&mut graph, &b, &a).unwrap();
        let topic = graph.find_topic(&b).unwrap();
        assert_eq!(topic.messages()[1].id, nav.id);
        assert_eq!(topic.message_count(), 4);
        assert_eq!(nav.content, "Continue from: A");
        assert_eq!(nav.linked_parent_topic_id(), Some(a.as_str()));
        assert!(nav.is_navigation_link());
    }

    #[test]
    fn test_navigation_goes_to_head_without_system_message() {
        let (mut graph, mut log, a, b) = setup();
        log.append(&mut graph, &b, Sender::User, "question").unwrap();
        let nav = log.insert_navigation_message(&mut graph, &b, &a).unwrap();
        assert_eq!(graph.find_topic(&b).unwrap().messages()[0].id, nav.id);
    }

    #[test]
    fn test_history_spans_topics_and_skips_system() {
        let (mut graph, mut log, a, b) = setup();
        log.append(&mut graph, &a, Sender::User, "one").unwrap();
        log.append(&mut graph, &a, Sender::Assistant, "two").unwrap();
        log.append(&mut graph, &b, Sender::System, "banner").unwrap();
        log.insert_navigation_message(&mut graph, &b, &a).unwrap();
        log.append(&mut graph, &b, Sender::User, "three").unwrap();

        let entries = history(&graph, 20);
        let contents: Vec<&str> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "Continue from: A", "three"]);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[2].role, Role::Assistant);
    }

    #[test]
    fn test_history_keeps_only_the_most_recent() {
        let (mut graph, mut log, a, _) = setup();
        for i in 0..30 {
            log.append(&mut graph, &a, Sender::User, format!("m{i}")).unwrap();
        }
        let entries = history(&graph, 20);
        assert_eq!(entries.len(), 20);
        assert_eq!(entries[0].content, "m10");
        assert_eq!(entries[19].content, "m29");
    }

    #[test]
    fn test_restore_raises_counter_to_highest_id() {
        let (mut graph, mut log, a, _) = setup();
        log.append(&mut graph, &a, Sender::User, "x").unwrap();
        log.append(&mut graph, &a, Sender::User, "y").unwrap();
        let restored = MessageLog::restore(0, &graph);
        assert_eq!(restored.message_counter(), 2);
        let kept = MessageLog::restore(10, &graph);
        assert_eq!(kept.message_counter(), 10);
    }
}
