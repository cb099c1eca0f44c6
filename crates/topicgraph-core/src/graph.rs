//! The topic graph of one session.
//!
//! `Graph` owns the topics, the links between them and the "current topic"
//! selection. After every public mutation:
//! - topic ids are unique and every link endpoint names an existing topic
//! - the graph holds at least one topic once one has been created
//! - exactly one topic is current whenever the graph is non-empty

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TopicGraphError};
use crate::geometry::{LinkAnchors, Point, link_anchors};
use crate::topic::{Link, Topic, jittered_origin};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    topics: Vec<Topic>,
    links: Vec<Link>,
    current_topic_id: Option<String>,
}

/// What was repaired while restoring a persisted graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub duplicate_topics: usize,
    pub dropped_links: usize,
    pub current_repaired: bool,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_topics == 0 && self.dropped_links == 0 && !self.current_repaired
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from persisted parts, repairing what the invariants forbid.
    ///
    /// Later topics that reuse an earlier id are discarded, links with a missing
    /// endpoint (or pointing at themselves) are dropped, and a missing or
    /// dangling current topic falls back to the first topic.
    pub fn restore(
        topics: Vec<Topic>,
        links: Vec<Link>,
        current_topic_id: Option<String>,
    ) -> (Self, RestoreReport) {
        let mut report = RestoreReport::default();

        let mut seen = HashSet::new();
        let topics: Vec<Topic> = topics
            .into_iter()
            .filter(|t| {
                let fresh = seen.insert(t.id.clone());
                if !fresh {
                    report.duplicate_topics += 1;
                }
                fresh
            })
            .collect();

        let links: Vec<Link> = links
            .into_iter()
            .filter(|l| {
                let valid =
                    l.source != l.target && seen.contains(&l.source) && seen.contains(&l.target);
                if !valid {
                    report.dropped_links += 1;
                }
                valid
            })
            .collect();

        let current_valid = current_topic_id
            .as_ref()
            .is_some_and(|id| seen.contains(id));
        let current_topic_id = if current_valid {
            current_topic_id
        } else {
            let fallback = topics.first().map(|t| t.id.clone());
            report.current_repaired = fallback.is_some() || current_topic_id.is_some();
            fallback
        };

        (
            Self {
                topics,
                links,
                current_topic_id,
            },
            report,
        )
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn current_topic_id(&self) -> Option<&str> {
        self.current_topic_id.as_deref()
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.current_topic_id
            .as_deref()
            .and_then(|id| self.find_topic(id))
    }

    pub fn find_topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub(crate) fn find_topic_mut(&mut self, id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == id)
    }

    /// Creates a topic with a fresh id and a jittered layout hint.
    ///
    /// Records the parent's id and title when `parent_id` is given. Does not
    /// link the topic; the first topic of an empty graph becomes current.
    pub fn create_topic(&mut self, title: &str, parent_id: Option<&str>) -> Result<&Topic> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TopicGraphError::validation("topic title must not be empty"));
        }

        let parent = match parent_id {
            Some(pid) => {
                let parent = self
                    .find_topic(pid)
                    .ok_or_else(|| TopicGraphError::not_found("topic", pid))?;
                Some((parent.id.clone(), parent.title.clone()))
            }
            None => None,
        };

        let topic = Topic::new(
            Uuid::new_v4().to_string(),
            title.to_string(),
            parent.as_ref().map(|(id, name)| (id.as_str(), name.as_str())),
            jittered_origin(&mut rand::thread_rng()),
        );

        if self.current_topic_id.is_none() {
            self.current_topic_id = Some(topic.id.clone());
        }
        let index = self.topics.len();
        self.topics.push(topic);

        Ok(&self.topics[index])
    }

    /// Appends a `source -> target` link.
    ///
    /// Both ends must exist and differ. An identical link already present is
    /// left as is (returns `false`).
    pub fn link_topics(&mut self, source_id: &str, target_id: &str) -> Result<bool> {
        if self.find_topic(source_id).is_none() {
            return Err(TopicGraphError::not_found("topic", source_id));
        }
        if self.find_topic(target_id).is_none() {
            return Err(TopicGraphError::not_found("topic", target_id));
        }
        if source_id == target_id {
            return Err(TopicGraphError::validation("a topic cannot link to itself"));
        }

        let link = Link::new(source_id, target_id);
        if self.links.contains(&link) {
            return Ok(false);
        }
        self.links.push(link);
        Ok(true)
    }

    /// Removes a topic and every link touching it.
    ///
    /// The last remaining topic cannot be deleted. When the deleted topic was
    /// current, the first remaining topic becomes current.
    pub fn delete_topic(&mut self, id: &str) -> Result<Topic> {
        let index = self
            .topics
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TopicGraphError::not_found("topic", id))?;

        if self.topics.len() == 1 {
            return Err(TopicGraphError::guard(
                "cannot delete the only remaining topic",
            ));
        }

        let removed = self.topics.remove(index);
        self.links.retain(|l| !l.touches(id));

        if self.current_topic_id.as_deref() == Some(id) {
            self.current_topic_id = self.topics.first().map(|t| t.id.clone());
        }

        Ok(removed)
    }

    /// Renames a topic. Blank titles leave the topic unchanged (returns `false`).
    pub fn rename_topic(&mut self, id: &str, new_title: &str) -> Result<bool> {
        let topic = self
            .find_topic_mut(id)
            .ok_or_else(|| TopicGraphError::not_found("topic", id))?;

        let new_title = new_title.trim();
        if new_title.is_empty() || new_title == topic.title {
            return Ok(false);
        }
        topic.title = new_title.to_string();
        Ok(true)
    }

    /// Makes an existing topic current.
    pub fn select_topic(&mut self, id: &str) -> Result<&Topic> {
        let index = self
            .topics
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TopicGraphError::not_found("topic", id))?;
        self.current_topic_id = Some(id.to_string());
        Ok(&self.topics[index])
    }

    // ------------------------------------------------------------------------
    // Layout collaborator hand-off
    // ------------------------------------------------------------------------

    /// Node positions and link pairs for the layout collaborator.
    pub fn layout_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            nodes: self
                .topics
                .iter()
                .map(|t| LayoutNode {
                    id: t.id.clone(),
                    position: t.position,
                })
                .collect(),
            links: self.links.clone(),
        }
    }

    /// Stores positions reported by a layout tick. Unknown ids and
    /// non-finite positions are ignored.
    pub fn apply_layout_tick<'a, I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, Point)>,
    {
        let mut updated = 0;
        for (id, position) in positions {
            if !position.is_finite() {
                continue;
            }
            if let Some(topic) = self.find_topic_mut(id) {
                topic.position = position;
                updated += 1;
            }
        }
        updated
    }

    /// Both anchor points of every link at the current positions.
    pub fn link_anchors(&self) -> Vec<(Link, LinkAnchors)> {
        self.links
            .iter()
            .filter_map(|link| {
                let source = self.find_topic(&link.source)?;
                let target = self.find_topic(&link.target)?;
                Some((link.clone(), link_anchors(source.position, target.position)))
            })
            .collect()
    }
}

/// A node as seen by the layout collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub position: Point,
}

/// Everything the layout collaborator needs for one simulation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<Link>,
}
