//! Error types for the `docchat-rag` crate.

use thiserror::Error;

/// Errors that can occur during ingestion and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// The raw document could not be turned into text.
    ///
    /// Not retried; surfaced to the user as an unreadable file.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The embedding service call failed or returned a malformed response.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index backend failed or a namespace rule was violated.
    ///
    /// Fatal for the current request and never retried automatically; the
    /// gateway logs these for operator attention.
    #[error("Vector index error ({backend}): {message}")]
    Index {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in ingestion orchestration itself (e.g. a provider broke
    /// the one-vector-per-input contract).
    #[error("Ingestion error: {0}")]
    Ingest(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
