//! The retrieval-generation orchestrator.
//!
//! One question-answer cycle is a linear, two-stage state machine:
//! RETRIEVE (embed the question, search the collection's namespace, join
//! the returned passages) then GENERATE (assemble the role-tagged prompt
//! and invoke the model). Retrieval always completes before generation
//! starts; there is no overlap between the stages.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_chat::{ChatConfig, ChatOrchestrator};
//!
//! let orchestrator = ChatOrchestrator::builder()
//!     .config(ChatConfig::default())
//!     .embedding_provider(embedder)
//!     .gateway(gateway)
//!     .generation_client(Arc::new(client))
//!     .build()?;
//!
//! let answer = orchestrator.answer("folder-1", "What is this about?", &history).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use docchat_rag::{EmbeddingProvider, IndexGateway};

use crate::error::{ChatError, Result};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::prompt::ChatPrompt;
use crate::turn::ConversationTurn;

/// Separator placed between retrieved passages so the model can tell
/// independent passages apart.
const PASSAGE_BOUNDARY: &str = "\n\n";

/// Configuration for the question-answer cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// How many chunks to retrieve per question.
    pub top_k: usize,
    /// Sampling temperature; kept near zero for grounded, reproducible
    /// answers.
    pub temperature: f32,
    /// Optional cap on answer length in tokens.
    pub max_output_tokens: Option<u32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { top_k: 4, temperature: 0.0, max_output_tokens: None }
    }
}

/// The query-time orchestrator: retrieve context, then generate an answer.
///
/// Stateless per request — `answer` takes `&self` and shares nothing
/// mutable between cycles, so independent conversations run fully in
/// parallel. The caller persists the returned answer as the assistant
/// turn; a cancelled request drops the future and nothing is applied.
pub struct ChatOrchestrator {
    config: ChatConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    gateway: Arc<IndexGateway>,
    generation_client: Arc<dyn GenerationClient>,
}

impl ChatOrchestrator {
    /// Create a new [`ChatOrchestratorBuilder`].
    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    /// Answer a question against one collection.
    ///
    /// RETRIEVE embeds the question and searches the collection's
    /// namespace; zero retrieved chunks degrades to a no-context prompt
    /// rather than failing. GENERATE presents `[context, ...history in
    /// chronological order, question]` to the model at the configured
    /// (near-zero) temperature.
    pub async fn answer(
        &self,
        collection_id: &str,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String> {
        // ── RETRIEVE ───────────────────────────────────────────────
        let query_vector = self.embedding_provider.embed(question).await?;
        let results = self.gateway.search(collection_id, &query_vector, self.config.top_k).await?;

        let context = if results.is_empty() {
            debug!(collection_id, "no chunks retrieved, degrading to ungrounded answer");
            None
        } else {
            let joined = results
                .iter()
                .map(|r| r.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join(PASSAGE_BOUNDARY);
            Some(joined)
        };

        info!(
            collection_id,
            retrieved = results.len(),
            history_len = history.len(),
            "retrieval complete"
        );

        // ── GENERATE ───────────────────────────────────────────────
        let prompt =
            ChatPrompt { context, history: history.to_vec(), question: question.to_string() };

        let request = GenerationRequest {
            messages: prompt.into_messages(),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };

        let answer = self.generation_client.generate(request).await?;

        info!(
            collection_id,
            model = self.generation_client.name(),
            answer_len = answer.len(),
            "generation complete"
        );

        Ok(answer)
    }
}

/// Builder for constructing a [`ChatOrchestrator`].
#[derive(Default)]
pub struct ChatOrchestratorBuilder {
    config: Option<ChatConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    gateway: Option<Arc<IndexGateway>>,
    generation_client: Option<Arc<dyn GenerationClient>>,
}

impl ChatOrchestratorBuilder {
    /// Set the chat configuration.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used to embed questions.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the index gateway used for retrieval.
    pub fn gateway(mut self, gateway: Arc<IndexGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the generation client.
    pub fn generation_client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.generation_client = Some(client);
        self
    }

    /// Build the [`ChatOrchestrator`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if any required field is missing or
    /// `top_k` is zero.
    pub fn build(self) -> Result<ChatOrchestrator> {
        let config = self.config.unwrap_or_default();
        if config.top_k == 0 {
            return Err(ChatError::Config("top_k must be greater than zero".to_string()));
        }
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| ChatError::Config("embedding_provider is required".to_string()))?;
        let gateway =
            self.gateway.ok_or_else(|| ChatError::Config("gateway is required".to_string()))?;
        let generation_client = self
            .generation_client
            .ok_or_else(|| ChatError::Config("generation_client is required".to_string()))?;

        Ok(ChatOrchestrator { config, embedding_provider, gateway, generation_client })
    }
}
