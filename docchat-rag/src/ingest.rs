//! Document ingestion pipeline.
//!
//! [`IngestionPipeline`] orchestrates the write path for one uploaded
//! document: extract → chunk → embed → upsert. Each step is a potential
//! failure point, and a failure at any of them aborts the whole document —
//! no chunk of a failed document is ever visible to search.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{IngestionPipeline, RagConfig};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .extractor(Arc::new(PlainTextExtractor))
//!     .chunker(Arc::new(FixedSizeChunker::new(1000, 200)))
//!     .embedding_provider(Arc::new(embedder))
//!     .gateway(Arc::new(gateway))
//!     .build()?;
//!
//! let receipt = pipeline.ingest(&bytes, "notes.txt", "folder-1").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, IngestReceipt};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::TextExtractor;
use crate::gateway::IndexGateway;

/// Derive a stable document ID from an uploaded file name.
///
/// The extension is stripped and anything outside `[A-Za-z0-9._-]` becomes
/// a hyphen, so re-uploading the same file maps to the same document and
/// overwrites its chunks.
pub fn document_id_for(file_name: &str) -> Result<String> {
    let name = file_name.rsplit('/').next().unwrap_or(file_name);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let id: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect();
    if id.is_empty() {
        return Err(RagError::Ingest(format!("cannot derive document id from '{file_name}'")));
    }
    Ok(id)
}

/// The ingestion pipeline: extract → chunk → embed → upsert.
///
/// Stateless per run — `ingest` takes `&self`, holds no locks, and shares
/// nothing mutable between runs, so independent documents ingest fully in
/// parallel. Construct one via [`IngestionPipeline::builder()`].
pub struct IngestionPipeline {
    config: RagConfig,
    extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    gateway: Arc<IndexGateway>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the index gateway.
    pub fn gateway(&self) -> &Arc<IndexGateway> {
        &self.gateway
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Ingest one uploaded document into a collection.
    ///
    /// Extracts text from the raw bytes, then runs
    /// [`ingest_document`](Self::ingest_document). A non-empty upload that
    /// produces no text is reported as an extraction failure rather than
    /// silently indexing nothing.
    pub async fn ingest(
        &self,
        bytes: &[u8],
        file_name: &str,
        collection_id: &str,
    ) -> Result<IngestReceipt> {
        let text = self.extractor.extract(bytes, file_name).map_err(|e| {
            error!(file_name, error = %e, "extraction failed");
            e
        })?;

        if text.trim().is_empty() && !bytes.is_empty() {
            return Err(RagError::Extraction(format!(
                "'{file_name}' produced no extractable text"
            )));
        }

        let document = Document {
            id: document_id_for(file_name)?,
            text,
            metadata: HashMap::from([("file_name".to_string(), file_name.to_string())]),
            source_uri: None,
        };

        self.ingest_document(&document, collection_id).await
    }

    /// Ingest a document whose text has already been extracted.
    ///
    /// Chunks the text, embeds every chunk in one logical batch, and
    /// upserts the result under the collection's namespace. Embedding or
    /// index failure aborts the whole document with nothing indexed.
    pub async fn ingest_document(
        &self,
        document: &Document,
        collection_id: &str,
    ) -> Result<IngestReceipt> {
        let mut chunks = self.chunker.chunk(document);

        if chunks.is_empty() {
            if !document.text.is_empty() {
                // Extraction degenerate: text came back but chunked to nothing.
                return Err(RagError::Extraction(format!(
                    "document '{}' yielded no chunks",
                    document.id
                )));
            }
            info!(document.id = %document.id, chunk_count = 0, "ingested empty document");
            return Ok(IngestReceipt { document_id: document.id.clone(), chunk_count: 0 });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Ingest(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        // Last step: only after this returns is anything visible to search.
        self.gateway.upsert(collection_id, &chunks).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            e
        })?;

        let chunk_count = chunks.len();
        info!(document.id = %document.id, collection_id, chunk_count, "ingested document");

        Ok(IngestReceipt { document_id: document.id.clone(), chunk_count })
    }
}

/// Builder for constructing an [`IngestionPipeline`].
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    extractor: Option<Arc<dyn TextExtractor>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    gateway: Option<Arc<IndexGateway>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the text extractor.
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the index gateway.
    pub fn gateway(mut self, gateway: Arc<IndexGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let extractor =
            self.extractor.ok_or_else(|| RagError::Config("extractor is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let gateway =
            self.gateway.ok_or_else(|| RagError::Config("gateway is required".to_string()))?;

        Ok(IngestionPipeline { config, extractor, chunker, embedding_provider, gateway })
    }
}
