//! The assistant-reply collaborator: given a prompt and history, return the
//! reply text or a typed failure.

pub mod openai_replier;
pub mod replier;

pub use openai_replier::OpenAiReplier;
pub use replier::{AssistantReplier, ReplyError};
