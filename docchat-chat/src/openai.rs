//! OpenAI-compatible chat-completions generation client.
//!
//! This module is only available when the `openai` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{ChatError, Result};
use crate::generation::{ChatMessage, GenerationClient, GenerationRequest};

/// The default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The default generation model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Transient failures are retried at most this many times.
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential retry backoff.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// A [`GenerationClient`] backed by an OpenAI-compatible
/// `/chat/completions` endpoint.
///
/// Transport errors and throttling responses are retried a small bounded
/// number of times with exponential backoff; everything else surfaces as
/// [`ChatError::Generation`].
///
/// # Example
///
/// ```rust,ignore
/// use docchat_chat::openai::OpenAIChatClient;
///
/// let client = OpenAIChatClient::new("sk-...")?.with_model("gpt-4o");
/// let answer = client.generate(request).await?;
/// ```
pub struct OpenAIChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OpenAIChatClient {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Generation {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| ChatError::Generation {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at an OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set how many times transient failures are retried.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    fn generation_error(&self, message: String) -> ChatError {
        ChatError::Generation { provider: "OpenAI".into(), message }
    }

    async fn send_with_retry(&self, body: &CompletionRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut attempt = 0u32;
        loop {
            let outcome = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await;

            let retryable = match &outcome {
                Ok(resp) => {
                    let status = resp.status();
                    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                }
                Err(_) => true,
            };

            if !retryable || attempt >= self.max_retries {
                return outcome.map_err(|e| {
                    error!(provider = "OpenAI", error = %e, "generation request failed");
                    self.generation_error(format!("request failed: {e}"))
                });
            }

            let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
            warn!(provider = "OpenAI", attempt, delay_ms = delay.as_millis() as u64,
                "transient generation failure, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── GenerationClient implementation ────────────────────────────────

#[async_trait]
impl GenerationClient for OpenAIChatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            message_count = request.messages.len(),
            temperature = request.temperature,
            "generating answer"
        );

        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let response = self.send_with_retry(&body).await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);

            error!(provider = "OpenAI", %status, "generation API error");
            return Err(self.generation_error(format!("API returned {status}: {detail}")));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse generation response");
            self.generation_error(format!("failed to parse response: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| self.generation_error("API returned no completion text".into()))
    }
}
