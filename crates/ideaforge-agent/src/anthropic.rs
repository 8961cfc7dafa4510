//! Anthropic Messages API adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::{check_status, http_client, ChatMessage, LlmClient, DEFAULT_TIMEOUT};
use crate::error::{ClientError, Result};

/// Default Messages API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const API_VERSION: &str = "2023-06-01";

/// Client for the native Anthropic protocol.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a client with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(DEFAULT_TIMEOUT, false)?,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
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

    /// Override the endpoint URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "is_blank")]
    system: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn into_text(self) -> std::result::Result<String, ClientError> {
        self.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| ClientError::MalformedResponse("no content in response".into()))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn send(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> std::result::Result<String, ClientError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages,
            temperature,
            system: system_prompt,
        };

        trace!("Sending messages request: {:?}", request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response: MessagesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic response received"
            );
        }

        response.into_text()
    }

    fn model(&self) -> &str {
        &self.model
    }
}
