//! # docchat-chat
//!
//! The query-time core of DocChat: takes a user question, a target
//! collection, and the conversation so far, retrieves the most relevant
//! chunks through the [`docchat_rag`] gateway, and conditions a language
//! model on them to produce a grounded answer.
//!
//! ## Overview
//!
//! - [`ConversationTurn`] / [`Role`] — the ordered conversation model
//! - [`ChatPrompt`] — named `context` / `history` / `question` fields,
//!   flattened into a fixed message order (context first, question last)
//! - [`GenerationClient`] — external language-model invocation wrapper
//! - [`ChatOrchestrator`] — the RETRIEVE → GENERATE state machine
//!
//! ## Feature flags
//!
//! - `openai` — [`OpenAIChatClient`](openai::OpenAIChatClient) over any
//!   OpenAI-compatible `/chat/completions` endpoint

pub mod error;
pub mod generation;
#[cfg(feature = "openai")]
pub mod openai;
pub mod orchestrator;
pub mod prompt;
pub mod turn;

pub use error::{ChatError, Result};
pub use generation::{ChatMessage, GenerationClient, GenerationRequest, MessageRole};
#[cfg(feature = "openai")]
pub use openai::OpenAIChatClient;
pub use orchestrator::{ChatConfig, ChatOrchestrator, ChatOrchestratorBuilder};
pub use prompt::{CONTEXT_HEADER, ChatPrompt, NO_CONTEXT_MARKER};
pub use turn::{ConversationTurn, Role};
