//! # docchat-rag
//!
//! The ingestion and retrieval core of DocChat: turns uploaded documents
//! into indexed, namespace-isolated chunks and answers similarity queries
//! against them.
//!
//! ## Overview
//!
//! - [`Chunker`] / [`FixedSizeChunker`] / [`RecursiveChunker`] — split
//!   extracted text into bounded, overlapping chunks
//! - [`EmbeddingProvider`] — order-preserving text → vector conversion
//! - [`VectorStore`] / [`InMemoryVectorStore`] — similarity-search backends
//! - [`IndexGateway`] — the namespace-enforcing facade every read and
//!   write goes through
//! - [`TextExtractor`] / [`PlainTextExtractor`] — raw bytes → text seam
//! - [`IngestionPipeline`] — extract → chunk → embed → upsert, all-or-nothing
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{
//!     FixedSizeChunker, IndexGateway, IngestionPipeline, InMemoryVectorStore,
//!     PlainTextExtractor, RagConfig,
//! };
//!
//! let config = RagConfig::builder().chunk_size(1000).chunk_overlap(200).top_k(4).build()?;
//! let gateway = Arc::new(IndexGateway::new(
//!     Arc::new(InMemoryVectorStore::new()),
//!     embedder.dimensions(),
//!     config.max_top_k,
//! ));
//! let pipeline = IngestionPipeline::builder()
//!     .config(config)
//!     .extractor(Arc::new(PlainTextExtractor))
//!     .chunker(Arc::new(FixedSizeChunker::new(1000, 200)))
//!     .embedding_provider(embedder)
//!     .gateway(gateway.clone())
//!     .build()?;
//!
//! let receipt = pipeline.ingest(&bytes, "notes.txt", "folder-1").await?;
//! ```
//!
//! ## Feature flags
//!
//! - `openai` — [`OpenAIEmbeddingProvider`](openai::OpenAIEmbeddingProvider)
//!   over any OpenAI-compatible `/embeddings` endpoint
//! - `qdrant` — [`QdrantVectorStore`](qdrant::QdrantVectorStore) backend

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod ingest;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, IngestReceipt, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{PlainTextExtractor, TextExtractor};
pub use gateway::IndexGateway;
pub use ingest::{IngestionPipeline, IngestionPipelineBuilder, document_id_for};
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
pub use vectorstore::VectorStore;
