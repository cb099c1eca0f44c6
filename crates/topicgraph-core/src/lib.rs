//! Topic-graph and session state engine.
//!
//! Sessions hold a branching graph of topics, each topic owning its own
//! message log. This crate is the storage- and transport-independent core:
//! the domain model, the operations that mutate it and the traits the outer
//! layers implement.

pub mod branching;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graph;
pub mod message_log;
pub mod prompt;
pub mod reply;
pub mod session;
pub mod settings;
pub mod suggestion;
pub mod topic;

pub use error::{Result, TopicGraphError};
pub use graph::Graph;
pub use message_log::MessageLog;
pub use prompt::{Prompter, Unattended};
pub use session::{Session, SessionSummary};
