use std::time::Duration;

use async_trait::async_trait;
use kaizen_http::prelude::*;
use kaizen_types::CompletionModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Public Anthropic endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable conventionally holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Model used for every analysis
pub const MODEL: &str = "claude-sonnet-4-5";

/// Upper bound on generated tokens per analysis
pub const MAX_TOKENS: u32 = 4000;

const API_VERSION: &str = "2023-06-01";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const SERVICE: &str = "Anthropic";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first text block
    fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Provider service for single-turn completions against the Messages API
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl AnthropicClient {
    /// Create a new client; fails if the API key is missing or blank
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let api_key = require_credential(API_KEY_ENV, api_key)?;
        info!("Completion provider initialized with model: {}", MODEL);
        Ok(Self {
            http: build_client(COMPLETION_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Point the client at another endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the default retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate a reply to `user_prompt` under `system_prompt`
    pub async fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let request = build_request(system_prompt, user_prompt, temperature);
        let url = format!("{}/v1/messages", self.base_url);

        debug!(
            system_len = system_prompt.len(),
            prompt_len = user_prompt.len(),
            temperature,
            "Sending completion request"
        );

        self.retry
            .run("Anthropic API", || async {
                let resp = self
                    .http
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", API_VERSION)
                    .json(&request)
                    .send()
                    .await?;
                let response: MessagesResponse = read_json(SERVICE, resp).await?;

                if response.stop_reason.as_deref() == Some("max_tokens") {
                    warn!("Completion was cut off at {} tokens", MAX_TOKENS);
                }

                response
                    .first_text()
                    .ok_or_else(|| ApiError::invalid_response(SERVICE, "no text content block"))
            })
            .await
    }
}

fn build_request<'a>(
    system_prompt: &'a str,
    user_prompt: &'a str,
    temperature: f32,
) -> MessagesRequest<'a> {
    MessagesRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        temperature,
        system: system_prompt,
        messages: vec![RequestMessage {
            role: "user",
            content: user_prompt,
        }],
    }
}

#[async_trait]
impl CompletionModel for AnthropicClient {
    async fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> anyhow::Result<String> {
        Ok(AnthropicClient::generate_response(self, system_prompt, user_prompt, temperature).await?)
    }
}
