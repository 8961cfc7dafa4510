//! OpenAI-compatible chat-completions adapter.
//!
//! Works against any server speaking the `/chat/completions` protocol,
//! including authenticating proxies that want a `user` field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::{check_status, http_client, ChatMessage, LlmClient, DEFAULT_TIMEOUT};
use crate::error::{ClientError, Result};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Client for OpenAI-compatible backends.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    user: Option<String>,
}

impl OpenAiClient {
    /// Create a client with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(DEFAULT_TIMEOUT, false)?,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user: None,
        })
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL; a trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a `user` identifier with every request.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(
        &'a self,
        messages: &[ChatMessage],
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> CompletionRequest<'a> {
        let mut all = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            all.push(ChatMessage::system(system_prompt));
        }
        all.extend_from_slice(messages);

        CompletionRequest {
            model: &self.model,
            messages: all,
            max_tokens: (max_tokens > 0).then_some(max_tokens),
            temperature: (temperature != 0.0).then_some(temperature),
            user: self.user.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl CompletionResponse {
    fn into_text(self) -> std::result::Result<String, ClientError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ClientError::MalformedResponse("no choices in response".into()))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn send(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> std::result::Result<String, ClientError> {
        let request = self.build_request(messages, system_prompt, temperature, max_tokens);

        trace!("Sending chat completion request: {:?}", request);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response: CompletionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion received"
            );
        }

        response.into_text()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_goes_first() {
        let client = OpenAiClient::new("key").unwrap();
        let request = client.build_request(&[ChatMessage::user("hi")], "sys", 0.6, 100);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0], ChatMessage::system("sys"));
        assert_eq!(request.messages[1], ChatMessage::user("hi"));
    }

    #[test]
    fn test_zero_temperature_is_omitted() {
        let client = OpenAiClient::new("key").unwrap();
        let request = client.build_request(&[ChatMessage::user("hi")], "", 0.0, 100);

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("user").is_none());
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_user_field_included_when_set() {
        let client = OpenAiClient::new("key").unwrap().with_user("alice");
        let request = client.build_request(&[], "sys", 0.5, 10);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["user"], "alice");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new("key")
            .unwrap()
            .with_base_url("http://proxy.local/v1/");
        assert_eq!(client.endpoint(), "http://proxy.local/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }"#;

        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "Hello!");
    }

    #[test]
    fn test_no_choices_is_malformed() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
