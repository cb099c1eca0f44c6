//! Terminal rendering of topics, messages and session lists.

use colored::Colorize;
use topicgraph_core::graph::Graph;
use topicgraph_core::session::SessionSummary;
use topicgraph_core::topic::{Message, Sender, Topic};

pub fn message_line(message: &Message) -> String {
    match message.sender {
        Sender::User => format!("{} {}", "you>".green().bold(), message.content.green()),
        Sender::Assistant => message
            .content
            .lines()
            .map(|line| line.bright_blue().to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        Sender::System => format!("-- {}", message.content).bright_black().to_string(),
        Sender::Navigation => format!(
            "{} {}",
            format!("<- {}", message.content).yellow(),
            format!("(/back {})", message.id).bright_black()
        ),
    }
}

pub fn print_message(message: &Message) {
    println!("{}", message_line(message));
}

pub fn print_topic(topic: &Topic) {
    println!();
    println!("{}", format!("=== {} ===", topic.title()).bright_magenta().bold());
    for message in topic.messages() {
        print_message(message);
    }
}

/// One numbered line per topic; numbers are what `/goto` and `/delete` take.
pub fn topic_lines(graph: &Graph) -> Vec<String> {
    let current = graph.current_topic_id();
    graph
        .topics()
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let marker = if Some(topic.id()) == current { "*" } else { " " };
            let parent = topic
                .parent_topic_name()
                .map(|name| format!(" <- {}", name))
                .unwrap_or_default();
            format!(
                "{} {:>2}. {} ({} messages){}",
                marker,
                i + 1,
                topic.title(),
                topic.message_count(),
                parent
            )
        })
        .collect()
}

pub fn print_topics(graph: &Graph) {
    for line in topic_lines(graph) {
        println!("{}", line.cyan());
    }
}

pub fn session_line(index: usize, summary: &SessionSummary, active: bool) -> String {
    format!(
        "{} {:>2}. {}{} ({} topics, created {})",
        if active { "*" } else { " " },
        index + 1,
        summary.name,
        if summary.is_favorite { " [fav]" } else { "" },
        summary.topic_count,
        summary.created_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn print_sessions(sessions: &[SessionSummary], active_id: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No matching sessions".bright_black());
        return;
    }
    for (i, summary) in sessions.iter().enumerate() {
        let active = Some(summary.id.as_str()) == active_id;
        println!("{}", session_line(i, summary, active).cyan());
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{}", format!("Error: {}", message).red());
}

pub fn print_notice(message: impl std::fmt::Display) {
    println!("{}", message.to_string().bright_black());
}
