//! OpenAiReplier - Chat Completions over plain HTTPS.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use topicgraph_core::reply::ReplyRequest;
use topicgraph_core::topic::Role;

use crate::replier::{AssistantReplier, ReplyError};

pub const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Replier that talks to the OpenAI HTTP API.
///
/// No timeout is set; a request fails only when the transport or the
/// provider reports an error.
#[derive(Clone)]
pub struct OpenAiReplier {
    client: Client,
    endpoint: String,
}

impl Default for OpenAiReplier {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiReplier {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: BASE_URL.to_string(),
        }
    }

    /// Uses a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Overrides the chat-completions endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<String, ReplyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| ReplyError::Transport(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            ReplyError::MalformedResponse(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AssistantReplier for OpenAiReplier {
    async fn reply(&self, api_key: &str, request: &ReplyRequest) -> Result<String, ReplyError> {
        if api_key.trim().is_empty() {
            return Err(ReplyError::MissingCredentials);
        }

        let body = ChatCompletionRequest::from_reply_request(request);
        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            "Sending chat completion request"
        );
        self.send_request(api_key, &body).await
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// System prompt (when non-empty), then history, then the new user message.
    fn from_reply_request(request: &ReplyRequest) -> Self {
        let system = (!request.system_prompt.is_empty()).then(|| ChatMessage {
            role: "system",
            content: request.system_prompt.clone(),
        });
        let history = request.history.iter().map(|entry| ChatMessage {
            role: match entry.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: entry.content.clone(),
        });
        let user = ChatMessage {
            role: "user",
            content: request.user_message.clone(),
        };

        Self {
            model: request.model.clone(),
            messages: system.into_iter().chain(history).chain([user]).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, ReplyError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            ReplyError::MalformedResponse("OpenAI API returned no content in the response".into())
        })
}

/// Uses the provider's `error.message` when present, else `API Error: {status}`.
fn map_http_error(status: StatusCode, body: &str) -> ReplyError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("API Error: {}", status.as_u16()));

    tracing::warn!(status = status.as_u16(), %message, "OpenAI API returned an error");
    ReplyError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use topicgraph_core::topic::HistoryEntry;

    fn request() -> ReplyRequest {
        ReplyRequest {
            system_prompt: "be helpful".into(),
            history: vec![
                HistoryEntry {
                    role: Role::User,
                    content: "earlier question".into(),
                },
                HistoryEntry {
                    role: Role::Assistant,
                    content: "earlier answer".into(),
                },
            ],
            user_message: "new question".into(),
            model: "gpt-3.5-turbo".into(),
            max_tokens: 1000,
            temperature: Some(0.5),
        }
    }

    fn local_replier(url: String) -> OpenAiReplier {
        let client = Client::builder().no_proxy().build().unwrap();
        OpenAiReplier::new().with_client(client).with_endpoint(url)
    }

    /// Serves exactly one canned HTTP response and returns the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (url, handle)
    }

    #[test]
    fn test_request_message_order() {
        let body = ChatCompletionRequest::from_reply_request(&request());
        let roles: Vec<&str> = body.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(body.messages[3].content, "new question");

        let probe = ChatCompletionRequest::from_reply_request(&ReplyRequest::probe());
        assert_eq!(probe.messages.len(), 1);
        let json = serde_json::to_value(&probe).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 50);
    }

    #[test]
    fn test_http_error_message_extraction() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        );
        assert_eq!(
            err,
            ReplyError::Http {
                status: 401,
                message: "Incorrect API key provided".into()
            }
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "API Error: 502");
    }

    #[test]
    fn test_empty_choices_are_malformed() {
        let err = extract_text_response(ChatCompletionResponse { choices: Vec::new() }).unwrap_err();
        assert!(matches!(err, ReplyError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_reply_round_trip_against_local_server() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Hi from the stub"}}]}"#,
        )
        .await;

        let replier = local_replier(url);
        let reply = replier.reply("sk-test", &request()).await.unwrap();
        assert_eq!(reply, "Hi from the stub");

        let raw_request = server.await.unwrap();
        assert!(raw_request.contains("Bearer sk-test") || raw_request.contains("bearer sk-test"));
        assert!(raw_request.contains("\"new question\""));
    }

    #[tokio::test]
    async fn test_reply_surfaces_provider_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 429 Too Many Requests",
            r#"{"error":{"message":"Rate limit reached"}}"#,
        )
        .await;

        let replier = local_replier(url);
        let err = replier.reply("sk-test", &request()).await.unwrap_err();
        assert_eq!(
            err,
            ReplyError::Http {
                status: 429,
                message: "Rate limit reached".into()
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let replier = OpenAiReplier::new().with_endpoint("http://127.0.0.1:9/unused");
        assert_eq!(
            replier.reply("  ", &request()).await.unwrap_err(),
            ReplyError::MissingCredentials
        );
        assert_eq!(
            replier.test_api("").await.unwrap_err(),
            ReplyError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let replier = local_replier(format!("http://{}/", addr));
        let err = replier.reply("sk-test", &request()).await.unwrap_err();
        assert!(matches!(err, ReplyError::Transport(_)));
    }
}
