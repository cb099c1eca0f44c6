//! Creating a new topic from the current one.

use crate::error::{Result, TopicGraphError};
use crate::graph::Graph;
use crate::message_log::MessageLog;
use crate::prompt::Prompter;
use crate::topic::{Sender, Topic};

/// Title of the topic every new session starts with.
pub const INITIAL_TOPIC_TITLE: &str = "General Discussion";

/// Selections shorter than this (after trimming) cannot become a topic.
pub const MIN_SELECTION_CHARS: usize = 3;

const SELECTION_TITLE_MAX_CHARS: usize = 50;
const SELECTION_TITLE_KEEP_CHARS: usize = 47;

/// Branches a new topic off the current one and makes it current.
///
/// The title is `title` when given, else whatever the prompter answers, else
/// `"Topic {N+1}"`. A title that is blank after trimming aborts the branch
/// before anything is touched. The new topic receives a
/// `"Started new topic: ..."` banner, then a navigation message back to the
/// previous topic if that topic had any messages, then (for `seed_text`
/// longer than the title) a user message quoting the seed.
pub fn branch_from_current(
    graph: &mut Graph,
    log: &mut MessageLog,
    title: Option<&str>,
    seed_text: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<Topic> {
    let title = resolve_title(graph, title, prompter)?;

    let parent = graph
        .current_topic()
        .map(|t| (t.id().to_string(), !t.messages().is_empty()));
    let parent_id = parent.as_ref().map(|(id, _)| id.as_str());

    let topic_id = graph.create_topic(&title, parent_id)?.id().to_string();
    let title = graph
        .find_topic(&topic_id)
        .map(|t| t.title().to_string())
        .unwrap_or(title);

    if let Some(parent_id) = parent_id {
        graph.link_topics(parent_id, &topic_id)?;
    }
    graph.select_topic(&topic_id)?;

    log.append(
        graph,
        &topic_id,
        Sender::System,
        format!("Started new topic: {}", title),
    )?;

    if let Some((parent_id, true)) = &parent {
        log.insert_navigation_message(graph, &topic_id, parent_id)?;
    }

    if let Some(seed) = seed_text.filter(|s| s.chars().count() > title.chars().count()) {
        log.append(
            graph,
            &topic_id,
            Sender::User,
            format!("Please explain more about: \"{}\"", seed),
        )?;
    }

    graph
        .find_topic(&topic_id)
        .cloned()
        .ok_or_else(|| TopicGraphError::internal("branched topic vanished"))
}

/// Branches a topic named after a passage of text.
///
/// Selections shorter than [`MIN_SELECTION_CHARS`] are rejected. The title is
/// the selection cut to 47 characters plus `"..."` when it exceeds 50, with
/// whitespace runs collapsed; the full selection becomes the seed.
pub fn branch_from_selection(
    graph: &mut Graph,
    log: &mut MessageLog,
    selected_text: &str,
    prompter: &dyn Prompter,
) -> Result<Topic> {
    let selected = selected_text.trim();
    if selected.chars().count() < MIN_SELECTION_CHARS {
        return Err(TopicGraphError::validation(format!(
            "selection must be at least {} characters",
            MIN_SELECTION_CHARS
        )));
    }

    let title = selection_title(selected);
    branch_from_current(graph, log, Some(&title), Some(selected), prompter)
}

/// Gives an empty graph its initial topic, or repairs a missing selection.
///
/// The initial topic starts without messages. Returns the id of the topic
/// that was created, if any.
pub fn ensure_initial_topic(graph: &mut Graph) -> Result<Option<String>> {
    if graph.is_empty() {
        let topic_id = graph
            .create_topic(INITIAL_TOPIC_TITLE, None)?
            .id()
            .to_string();
        graph.select_topic(&topic_id)?;
        return Ok(Some(topic_id));
    }
    if graph.current_topic().is_none() {
        if let Some(first) = graph.topics().first().map(|t| t.id().to_string()) {
            graph.select_topic(&first)?;
        }
    }
    Ok(None)
}

fn resolve_title(graph: &Graph, title: Option<&str>, prompter: &dyn Prompter) -> Result<String> {
    let candidate = match title.filter(|t| !t.is_empty()) {
        Some(given) => Some(given.to_string()),
        None => prompter.request_title().filter(|t| !t.is_empty()),
    };

    match candidate {
        Some(title) if title.trim().is_empty() => {
            Err(TopicGraphError::validation("topic title must not be empty"))
        }
        Some(title) => Ok(title.trim().to_string()),
        None => Ok(format!("Topic {}", graph.topic_count() + 1)),
    }
}

fn selection_title(selected: &str) -> String {
    let cut = if selected.chars().count() > SELECTION_TITLE_MAX_CHARS {
        let head: String = selected.chars().take(SELECTION_TITLE_KEEP_CHARS).collect();
        format!("{}...", head)
    } else {
        selected.to_string()
    };
    cut.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Unattended;

    struct AnswersTitle(&'static str);

    impl Prompter for AnswersTitle {
        fn request_title(&self) -> Option<String> {
            Some(self.0.to_string())
        }

        fn confirm_branch(&self, _suggested_title: &str) -> bool {
            true
        }

        fn request_session_name(&self, _current_name: &str) -> Option<String> {
            None
        }
    }

    fn seeded() -> (Graph, MessageLog, String) {
        let mut graph = Graph::new();
        let log = MessageLog::new();
        ensure_initial_topic(&mut graph).unwrap();
        let root = graph.current_topic_id().unwrap().to_string();
        (graph, log, root)
    }

    #[test]
    fn test_initial_topic_starts_empty() {
        let (graph, log, root) = seeded();
        let topic = graph.find_topic(&root).unwrap();
        assert_eq!(topic.title(), INITIAL_TOPIC_TITLE);
        assert!(topic.messages().is_empty());
        assert_eq!(log.message_counter(), 0);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_branch_links_and_navigates_back() {
        let (mut graph, mut log, root) = seeded();
        log.append(&mut graph, &root, Sender::User, "hello").unwrap();

        let details =
            branch_from_current(&mut graph, &mut log, Some("Details"), None, &Unattended).unwrap();

        assert_eq!(graph.current_topic_id(), Some(details.id()));
        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.links()[0].source, root);
        assert_eq!(graph.links()[0].target, details.id());
        assert_eq!(details.parent_topic_id(), Some(root.as_str()));
        assert_eq!(details.parent_topic_name(), Some(INITIAL_TOPIC_TITLE));

        let messages = details.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::System);
        assert_eq!(messages[0].content, "Started new topic: Details");
        assert_eq!(messages[1].sender, Sender::Navigation);
        assert_eq!(messages[1].content, "Continue from: General Discussion");
        assert_eq!(details.message_count(), 2);
    }

    #[test]
    fn test_branch_from_silent_topic_has_no_navigation() {
        let mut graph = Graph::new();
        let mut log = MessageLog::new();
        graph.create_topic("Empty", None).unwrap();
        let topic =
            branch_from_current(&mut graph, &mut log, Some("Next"), None, &Unattended).unwrap();
        assert_eq!(topic.messages().len(), 1);
        assert_eq!(graph.links().len(), 1);
    }

    #[test]
    fn test_title_falls_back_to_prompt_then_counter() {
        let (mut graph, mut log, _) = seeded();
        let prompted =
            branch_from_current(&mut graph, &mut log, None, None, &AnswersTitle("Asked")).unwrap();
        assert_eq!(prompted.title(), "Asked");

        let synthesized =
            branch_from_current(&mut graph, &mut log, None, None, &Unattended).unwrap();
        assert_eq!(synthesized.title(), "Topic 3");

        let empty_answer =
            branch_from_current(&mut graph, &mut log, None, None, &AnswersTitle("")).unwrap();
        assert_eq!(empty_answer.title(), "Topic 4");
    }

    #[test]
    fn test_blank_title_aborts_without_mutation() {
        let (mut graph, mut log, _) = seeded();
        let before = graph.clone();
        let counter = log.message_counter();

        let err = branch_from_current(&mut graph, &mut log, Some("   "), None, &Unattended)
            .unwrap_err();
        assert!(err.is_validation());
        let err = branch_from_current(&mut graph, &mut log, None, None, &AnswersTitle("  \t"))
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(graph, before);
        assert_eq!(log.message_counter(), counter);
    }

    #[test]
    fn test_selection_branch_truncates_and_seeds() {
        let (mut graph, mut log, _) = seeded();
        let text = "a fairly long passage of assistant output that keeps going well past fifty";
        let topic = branch_from_selection(&mut graph, &mut log, text, &Unattended).unwrap();

        assert!(topic.title().ends_with("..."));
        assert_eq!(topic.title().chars().count(), 50);
        let last = topic.messages().last().unwrap();
        assert_eq!(last.sender, Sender::User);
        assert_eq!(last.content, format!("Please explain more about: \"{}\"", text));
    }

    #[test]
    fn test_selection_branch_collapses_whitespace() {
        let (mut graph, mut log, _) = seeded();
        let topic =
            branch_from_selection(&mut graph, &mut log, "borrow\n\n  checker", &Unattended)
                .unwrap();
        assert_eq!(topic.title(), "borrow checker");
        assert_eq!(
            topic.messages().last().unwrap().content,
            "Please explain more about: \"borrow\n\n  checker\""
        );
    }

    #[test]
    fn test_short_selection_is_rejected() {
        let (mut graph, mut log, _) = seeded();
        let err = branch_from_selection(&mut graph, &mut log, "  ab ", &Unattended).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(graph.topic_count(), 1);
    }

    #[test]
    fn test_ensure_initial_topic_is_idempotent() {
        let (mut graph, _, _) = seeded();
        assert_eq!(ensure_initial_topic(&mut graph).unwrap(), None);
        assert_eq!(graph.topic_count(), 1);
    }
}
