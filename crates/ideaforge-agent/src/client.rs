//! The text-generation backend capability.
//!
//! Everything above this module depends only on [`LlmClient`]: given a
//! system prompt, a conversation, a temperature and a token budget, return
//! one completion or a [`ClientError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, ClientError, Result};

/// Default token budget for a completion.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default HTTP timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A message in the conversation sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender ("user", "assistant" or "system").
    pub role: String,

    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Submit a prompt, get text back.
///
/// Implementations must be cheap to share behind an `Arc`; one client
/// serves every agent of a discussion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a conversation and return the assistant's text.
    async fn send(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> std::result::Result<String, ClientError>;

    /// Single user turn with a system prompt.
    async fn simple_query(
        &self,
        query: &str,
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> std::result::Result<String, ClientError> {
        self.send(&[ChatMessage::user(query)], system_prompt, temperature, max_tokens)
            .await
    }

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// Build the shared HTTP client used by both adapters.
pub(crate) fn http_client(timeout: Duration, skip_tls_verify: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(skip_tls_verify)
        .build()
        .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Map a non-success response into a [`ClientError::Request`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Request {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl LlmClient for Echo {
        async fn send(
            &self,
            messages: &[ChatMessage],
            system_prompt: &str,
            temperature: f32,
            max_tokens: u32,
        ) -> std::result::Result<String, ClientError> {
            Ok(format!(
                "{}|{}|{}|{}|{}",
                system_prompt,
                messages.len(),
                messages[0].content,
                temperature,
                max_tokens
            ))
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
    }

    #[tokio::test]
    async fn test_simple_query_sends_one_user_turn() {
        let out = Echo.simple_query("hello", "be brief", 0.5, 100).await.unwrap();
        assert_eq!(out, "be brief|1|hello|0.5|100");
    }
}
