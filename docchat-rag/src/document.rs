//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing extracted text and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document, stable across re-ingestion.
    pub id: String,
    /// The extracted text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original uploaded file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

/// A contiguous slice of a [`Document`]'s text with its vector embedding.
///
/// Chunk identity is `{document_id}_{ordinal}`, so re-ingesting the same
/// document overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk (`{document_id}_{ordinal}`).
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus chunk-specific fields.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Zero-based position of this chunk within the document.
    pub ordinal: usize,
}

impl Chunk {
    /// Compute the canonical chunk ID for a document and ordinal.
    pub fn identity(document_id: &str, ordinal: usize) -> String {
        format!("{document_id}_{ordinal}")
    }
}

/// A retrieved [`Chunk`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// The outcome of a successful document ingestion, for the caller to
/// persist alongside document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReceipt {
    /// The ID assigned to the ingested document.
    pub document_id: String,
    /// How many chunks were indexed for the document.
    pub chunk_count: usize,
}
