//! The interactive chat loop.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use topicgraph_application::{ChatController, SendOutcome};
use topicgraph_core::Result as CoreResult;
use topicgraph_core::settings::Settings;

use crate::{export, render};

const COMMANDS: &[(&str, &str)] = &[
    ("/help", "show this help"),
    ("/topics", "list topics of the current session"),
    ("/new", "[title] branch a new topic from the current one"),
    ("/branch", "<text> branch a topic from a passage of text"),
    ("/goto", "<n> select topic n"),
    ("/back", "<message id> follow a navigation message to its parent"),
    ("/rename", "<title> rename the current topic"),
    ("/delete", "<n> delete topic n"),
    ("/history", "show the context sent with the next message"),
    ("/sessions", "[term] list sessions, optionally filtered"),
    ("/favorites", "[term] list favorite sessions"),
    ("/session-new", "[name] create and switch to a new session"),
    ("/switch", "<n> switch to session n"),
    ("/session-rename", "<name> rename the active session"),
    ("/session-delete", "<n> delete session n"),
    ("/fav", "toggle favorite on the active session"),
    ("/export", "[n] export the session, or topic n"),
    ("/settings", "show settings"),
    ("/key", "<api key> save the api key"),
    ("/model", "<model> save the model"),
    ("/test", "check the saved api key"),
    ("/quit", "exit"),
];

#[derive(Clone)]
struct ChatHelper {
    commands: Vec<String>,
}

impl ChatHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(c, _)| c.to_string()).collect(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ChatHelper {}

enum Flow {
    Continue,
    Quit,
}

pub async fn run(mut controller: ChatController, export_dir: PathBuf) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ChatHelper::new()));

    println!("{}", "=== TopicGraph ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or '/quit' to exit.".bright_black()
    );
    show_current(&controller);

    loop {
        let prompt = format!(
            "[{}] >> ",
            controller.current_topic().map(|t| t.title()).unwrap_or("-")
        );
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let flow = if trimmed.starts_with('/') {
                    command(&mut controller, trimmed, &export_dir).await
                } else {
                    send(&mut controller, trimmed).await;
                    Flow::Continue
                };
                if let Flow::Quit = flow {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                render::print_error(format!("{:?}", err));
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

fn show_current(controller: &ChatController) {
    if let Some(session) = controller.active_session() {
        render::print_notice(format!("Session: {}", session.name));
    }
    if let Some(topic) = controller.current_topic() {
        render::print_topic(topic);
    }
}

async fn send(controller: &mut ChatController, text: &str) {
    let ticket = match controller.begin_send(text) {
        Ok(SendOutcome::Pending(ticket)) => ticket,
        Ok(SendOutcome::MissingApiKey(hint)) => {
            render::print_message(&hint);
            return;
        }
        Ok(SendOutcome::Ignored) => return,
        Err(e) => {
            report(e);
            return;
        }
    };

    println!("{}", "AI is thinking...".bright_black());
    let result = controller.fetch_reply(&ticket).await;

    match controller.complete_send(ticket, result) {
        Ok(completed) => {
            render::print_message(&completed.message);
            if completed.branched.is_some() {
                show_current(controller);
            }
        }
        Err(e) => report(e),
    }
}

/// Ignored no-ops go to the debug log; everything else is shown.
fn report(error: topicgraph_core::TopicGraphError) {
    if error.is_benign() {
        tracing::debug!(error = %error, "Command ignored");
        render::print_notice(error);
    } else {
        render::print_error(error);
    }
}

fn report_result<T>(result: CoreResult<T>) -> Option<T> {
    result.map_err(report).ok()
}

fn topic_id_at(controller: &ChatController, arg: &str) -> Option<String> {
    let index: usize = arg.trim().parse().ok()?;
    controller
        .active_session()?
        .graph
        .topics()
        .get(index.checked_sub(1)?)
        .map(|t| t.id().to_string())
}

fn session_id_at(controller: &ChatController, arg: &str) -> Option<String> {
    let index: usize = arg.trim().parse().ok()?;
    let sessions = report_result(controller.sessions())?;
    sessions
        .get(index.checked_sub(1)?)
        .map(|s| s.id.clone())
}

async fn command(controller: &mut ChatController, line: &str, export_dir: &Path) -> Flow {
    let (name, arg) = match line.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };
    let optional = |arg: &str| Some(arg).filter(|a| !a.is_empty()).map(str::to_string);

    match name {
        "/quit" | "/exit" => return Flow::Quit,
        "/help" => {
            for (cmd, help) in COMMANDS {
                println!("{} {}", format!("{:<16}", cmd).cyan(), help.bright_black());
            }
        }
        "/topics" => {
            if let Some(session) = controller.active_session() {
                render::print_topics(&session.graph);
            }
        }
        "/new" => {
            let title = optional(arg);
            if report_result(controller.new_topic(title.as_deref())).is_some() {
                show_current(controller);
            }
        }
        "/branch" => {
            if report_result(controller.branch_from_selection(arg)).is_some() {
                show_current(controller);
            }
        }
        "/goto" => match topic_id_at(controller, arg) {
            Some(id) => {
                if report_result(controller.select_topic(&id)).is_some() {
                    show_current(controller);
                }
            }
            None => render::print_notice("No such topic"),
        },
        "/back" => match arg.parse::<u64>() {
            Ok(message_id) => {
                if report_result(controller.follow_navigation(message_id)).is_some() {
                    show_current(controller);
                }
            }
            Err(_) => render::print_notice("Usage: /back <message id>"),
        },
        "/rename" => {
            let current = controller.current_topic().map(|t| t.id().to_string());
            if let Some(id) = current {
                report_result(controller.rename_topic(&id, arg));
            }
        }
        "/delete" => match topic_id_at(controller, arg) {
            Some(id) => {
                if let Some(topic) = report_result(controller.delete_topic(&id)) {
                    render::print_notice(format!("Deleted topic \"{}\"", topic.title()));
                }
            }
            None => render::print_notice("No such topic"),
        },
        "/history" => {
            for entry in controller.history() {
                println!("{} {}", format!("{:?}:", entry.role).cyan(), entry.content);
            }
        }
        "/sessions" | "/favorites" => {
            let listed = if name == "/sessions" {
                controller.search_sessions(arg)
            } else {
                controller.favorite_sessions(arg)
            };
            if let Some(sessions) = report_result(listed) {
                let active = controller.active_session().map(|s| s.id.clone());
                render::print_sessions(&sessions, active.as_deref());
            }
        }
        "/session-new" => {
            let session_name = optional(arg);
            if report_result(controller.create_session(session_name.as_deref())).is_some() {
                show_current(controller);
            }
        }
        "/switch" => match session_id_at(controller, arg) {
            Some(id) => {
                if report_result(controller.switch_session(&id)).is_some() {
                    show_current(controller);
                }
            }
            None => render::print_notice("No such session"),
        },
        "/session-rename" => {
            let active = controller.active_session().map(|s| s.id.clone());
            if let Some(id) = active {
                report_result(controller.rename_session(&id, arg));
            }
        }
        "/session-delete" => match session_id_at(controller, arg) {
            Some(id) => {
                if report_result(controller.delete_session(&id)).is_some() {
                    show_current(controller);
                }
            }
            None => render::print_notice("No such session"),
        },
        "/fav" => {
            let active = controller.active_session().map(|s| s.id.clone());
            if let Some(id) = active {
                if let Some(favorite) = report_result(controller.toggle_favorite(&id)) {
                    render::print_notice(if favorite {
                        "Added to favorites"
                    } else {
                        "Removed from favorites"
                    });
                }
            }
        }
        "/export" => {
            let written = if arg.is_empty() {
                export::write_session(controller, export_dir)
            } else {
                match topic_id_at(controller, arg) {
                    Some(id) => export::write_topic(controller, &id, export_dir),
                    None => {
                        render::print_notice("No such topic");
                        return Flow::Continue;
                    }
                }
            };
            match written {
                Ok(path) => render::print_notice(format!("Exported to {}", path.display())),
                Err(e) => render::print_error(e),
            }
        }
        "/settings" => print_settings(controller.settings()),
        "/key" | "/model" => {
            let mut settings = controller.settings().clone();
            if name == "/key" {
                settings.api_key = arg.to_string();
            } else if arg.is_empty() {
                render::print_notice("Usage: /model <model>");
                return Flow::Continue;
            } else {
                settings.model = arg.to_string();
            }
            if report_result(controller.save_settings(settings)).is_some() {
                if let Some(last) = controller.current_topic().and_then(|t| t.messages().last()) {
                    render::print_message(last);
                }
            }
        }
        "/test" => {
            let key = controller.settings().api_key.clone();
            match controller.test_api(&key).await {
                Ok(()) => println!("{}", "API connection successful!".bright_green()),
                Err(e) => render::print_error(format!("API test failed: {}", e)),
            }
        }
        _ => render::print_notice("Unknown command, try /help"),
    }
    Flow::Continue
}

pub fn print_settings(settings: &Settings) {
    let key = if settings.has_api_key() {
        "set"
    } else {
        "not set"
    };
    println!("{} {}", "api key:    ".cyan(), key);
    println!("{} {}", "model:      ".cyan(), settings.model);
    println!("{} {}", "max tokens: ".cyan(), settings.max_tokens);
    println!("{} {}", "temperature:".cyan(), settings.temperature);
}
