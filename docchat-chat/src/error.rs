//! Error types for the `docchat-chat` crate.

use thiserror::Error;

/// Errors that can occur while answering a question.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The language model call failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Retrieval failed; the underlying embedding or index error.
    #[error(transparent)]
    Retrieval(#[from] docchat_rag::RagError),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
