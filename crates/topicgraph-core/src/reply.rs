//! What the engine hands to the assistant-reply collaborator.

use serde::{Deserialize, Serialize};

use crate::settings::{DEFAULT_MODEL, Settings};
use crate::topic::HistoryEntry;

/// The message sent when checking that an api key works.
pub const PROBE_MESSAGE: &str = "Hello! This is a test message.";
pub const PROBE_MAX_TOKENS: u32 = 50;

const UNKNOWN_SESSION: &str = "Unknown Session";
const FALLBACK_TOPIC: &str = "General Discussion";

/// One assistant round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub system_prompt: String,
    pub history: Vec<HistoryEntry>,
    pub user_message: String,
    pub model: String,
    pub max_tokens: u32,
    /// `None` leaves the temperature to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ReplyRequest {
    pub fn new(
        session_name: Option<&str>,
        topic_title: Option<&str>,
        history: Vec<HistoryEntry>,
        user_message: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        Self {
            system_prompt: system_prompt(
                session_name.unwrap_or(UNKNOWN_SESSION),
                topic_title.unwrap_or(FALLBACK_TOPIC),
            ),
            history,
            user_message: user_message.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: Some(settings.temperature),
        }
    }

    /// A minimal request to check credentials: no system prompt, no history.
    pub fn probe() -> Self {
        Self {
            system_prompt: String::new(),
            history: Vec::new(),
            user_message: PROBE_MESSAGE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: PROBE_MAX_TOKENS,
            temperature: None,
        }
    }
}

pub fn system_prompt(session_name: &str, topic_title: &str) -> String {
    format!(
        "You are a helpful AI assistant in session \"{}\". The current topic is \"{}\". \
         You have access to the conversation history across all topics in this session. \
         Keep responses engaging and educational. When referencing previous conversations \
         from other topics, you can mention the topic name for clarity.",
        session_name, topic_title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_settings_and_names() {
        let settings = Settings {
            model: "gpt-4o".into(),
            max_tokens: 42,
            ..Settings::default()
        };
        let request = ReplyRequest::new(Some("Work"), None, Vec::new(), "hi", &settings);
        assert!(request.system_prompt.contains("session \"Work\""));
        assert!(request.system_prompt.contains("topic is \"General Discussion\""));
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 42);
        assert_eq!(request.user_message, "hi");
        assert_eq!(request.temperature, Some(settings.temperature));
    }

    #[test]
    fn test_probe_request() {
        let probe = ReplyRequest::probe();
        assert!(probe.system_prompt.is_empty());
        assert_eq!(probe.model, "gpt-3.5-turbo");
        assert_eq!(probe.max_tokens, 50);
        assert_eq!(probe.temperature, None);
    }
}
