use async_trait::async_trait;
use thiserror::Error;
use topicgraph_core::TopicGraphError;
use topicgraph_core::reply::ReplyRequest;

/// Why a reply could not be produced.
///
/// The `Display` text is the human-readable message shown in the chat.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    #[error("No API key configured")]
    MissingCredentials,

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never got an answer (DNS, connect, TLS, ...)
    #[error("{0}")]
    Transport(String),

    /// The provider answered 2xx with something that is not a reply.
    #[error("{0}")]
    MalformedResponse(String),
}

impl From<ReplyError> for TopicGraphError {
    fn from(err: ReplyError) -> Self {
        TopicGraphError::remote(err.to_string())
    }
}

/// Produces assistant replies.
#[async_trait]
pub trait AssistantReplier: Send + Sync {
    /// Sends one round trip and returns the reply text.
    async fn reply(&self, api_key: &str, request: &ReplyRequest) -> Result<String, ReplyError>;

    /// Checks that `api_key` is accepted, using a minimal request.
    async fn test_api(&self, api_key: &str) -> Result<(), ReplyError> {
        if api_key.trim().is_empty() {
            return Err(ReplyError::MissingCredentials);
        }
        self.reply(api_key.trim(), &ReplyRequest::probe()).await?;
        Ok(())
    }
}
