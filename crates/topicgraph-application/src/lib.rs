//! Application layer for TopicGraph.
//!
//! Coordinates the domain model with persistence and the assistant backend:
//! the session manager keeps a working copy of the active session and
//! writes it through, the chat controller runs every user-facing operation.

pub mod bootstrap;
pub mod chat_controller;
pub mod session_manager;

pub use bootstrap::{Environment, build_controller, build_controller_with};
pub use chat_controller::{
    ChatController, CompletedReply, ControllerOptions, ReplyTicket, SendOutcome,
};
pub use session_manager::SessionManager;
