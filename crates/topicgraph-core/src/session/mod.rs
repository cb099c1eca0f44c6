//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the `Session` aggregate and its `SessionSummary`
//! - `repository`: persistence traits (`SessionStore`, `AppStateStore`)
//! - `search`: name filtering over session summaries

mod model;
mod repository;
mod search;

pub use model::{DEFAULT_SESSION_NAME, Session, SessionSummary};
pub use repository::{AppStateStore, SessionStore};
pub use search::{favorite_sessions, search_sessions};
