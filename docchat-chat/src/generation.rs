//! Generation client trait and request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The role a message plays in a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions and retrieved context.
    System,
    /// The human side of the conversation.
    User,
    /// Prior model output.
    Assistant,
}

/// One message in the sequence presented to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of this message.
    pub role: MessageRole,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// A fully assembled request for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The ordered message sequence.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature; the orchestrator pins this near zero to favor
    /// grounded, reproducible answers.
    pub temperature: f32,
    /// Optional cap on the answer length in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// A language-model invocation wrapper.
///
/// Implementations wrap one generation backend behind a unified async
/// interface and must not retry indefinitely on failure.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// A short identifier for the backing model, used in logs.
    fn name(&self) -> &str;

    /// Generate an answer for the given message sequence.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
