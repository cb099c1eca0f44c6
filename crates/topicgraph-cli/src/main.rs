use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use topicgraph_application::{ChatController, Environment, build_controller};
use topicgraph_core::{Prompter, Unattended};

mod export;
mod logging;
mod prompter;
mod render;
mod repl;

use prompter::TerminalPrompter;

#[derive(Parser)]
#[command(name = "topicgraph")]
#[command(about = "TopicGraph - branching topic graphs for LLM chats", long_about = None)]
struct Cli {
    /// Data directory (overrides TOPICGRAPH_HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Write the active session, or one of its topics, as JSON
    Export {
        /// Title of the topic to export instead of the whole session
        #[arg(long)]
        topic: Option<String>,
        /// Target directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List sessions, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        favorites: bool,
    },
    /// Create a session and make it active
    New { name: Option<String> },
    /// Make a session active
    Switch { id: String },
    Rename { id: String, name: String },
    /// Toggle the favorite flag
    Favorite { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// Check the saved api key against the API
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = match &cli.home {
        Some(home) => Environment::at(home),
        None => Environment::discover(),
    }
    .context("Failed to load configuration")?;
    logging::init(env.config.log_level.as_deref());

    let command = cli.command.unwrap_or(Commands::Chat);
    let prompter: Arc<dyn Prompter> = match command {
        Commands::Chat => Arc::new(TerminalPrompter),
        _ => Arc::new(Unattended),
    };
    let mut controller = build_controller(&env, prompter).context("Failed to open data")?;

    match command {
        Commands::Chat => repl::run(controller, std::env::current_dir()?).await?,
        Commands::Sessions { action } => sessions(&mut controller, action)?,
        Commands::Export { topic, output } => {
            let path = match topic {
                Some(title) => {
                    let id = topic_by_title(&controller, &title)?;
                    export::write_topic(&mut controller, &id, &output)?
                }
                None => export::write_session(&controller, &output)?,
            };
            println!("{}", path.display());
        }
        Commands::Settings { action } => settings(&mut controller, action).await?,
    }

    Ok(())
}

fn sessions(controller: &mut ChatController, action: SessionsAction) -> Result<()> {
    match action {
        SessionsAction::List { search, favorites } => {
            let term = search.unwrap_or_default();
            let listed = if favorites {
                controller.favorite_sessions(&term)?
            } else {
                controller.search_sessions(&term)?
            };
            let active = controller.active_session().map(|s| s.id.clone());
            for summary in listed {
                let marker = if Some(&summary.id) == active.as_ref() { "*" } else { " " };
                println!(
                    "{} {}  {}{}  {} topics",
                    marker,
                    summary.id.bright_black(),
                    summary.name,
                    if summary.is_favorite { " [fav]" } else { "" },
                    summary.topic_count
                );
            }
        }
        SessionsAction::New { name } => {
            let summary = controller.create_session(name.as_deref())?;
            println!("{} {}", summary.id, summary.name);
        }
        SessionsAction::Switch { id } => controller.switch_session(&id)?,
        SessionsAction::Rename { id, name } => {
            controller.rename_session(&id, &name)?;
        }
        SessionsAction::Favorite { id } => {
            let favorite = controller.toggle_favorite(&id)?;
            println!("{}", if favorite { "favorite" } else { "not favorite" });
        }
        SessionsAction::Delete { id } => controller.delete_session(&id)?,
    }
    Ok(())
}

async fn settings(controller: &mut ChatController, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => repl::print_settings(controller.settings()),
        SettingsAction::Set {
            api_key,
            model,
            max_tokens,
            temperature,
        } => {
            let mut settings = controller.settings().clone();
            if let Some(api_key) = api_key {
                settings.api_key = api_key;
            }
            if let Some(model) = model {
                settings.model = model;
            }
            if let Some(max_tokens) = max_tokens {
                settings.max_tokens = max_tokens;
            }
            if let Some(temperature) = temperature {
                settings.temperature = temperature;
            }
            controller.save_settings(settings)?;
            println!("{}", "Settings saved successfully!".bright_green());
        }
        SettingsAction::Test => {
            let key = controller.settings().api_key.clone();
            controller
                .test_api(&key)
                .await
                .map_err(|e| anyhow::anyhow!("API test failed: {}", e))?;
            println!("{}", "API connection successful!".bright_green());
        }
    }
    Ok(())
}

fn topic_by_title(controller: &ChatController, title: &str) -> Result<String> {
    controller
        .active_session()
        .and_then(|s| s.graph.topics().iter().find(|t| t.title() == title))
        .map(|t| t.id().to_string())
        .with_context(|| format!("No topic titled \"{}\" in the active session", title))
}
