//! Topic domain module.
//!
//! - `model`: graph node (`Topic`) and edge (`Link`) records
//! - `message`: message log entries (`Message`, `Sender`) and assistant history entries

mod message;
mod model;

pub use message::{HistoryEntry, Message, NavigationLink, Role, Sender};
pub use model::{Link, POSITION_JITTER, Topic, jittered_origin};
