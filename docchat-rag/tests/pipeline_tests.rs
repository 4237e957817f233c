//! Integration tests for the ingestion pipeline: chunk counts, idempotent
//! re-ingestion, and all-or-nothing failure handling.

use std::sync::Arc;

use async_trait::async_trait;
use docchat_rag::{
    EmbeddingProvider, FixedSizeChunker, IndexGateway, IngestionPipeline, InMemoryVectorStore,
    PlainTextExtractor, RagConfig, RagError,
};

const DIM: usize = 32;

/// Deterministic hash-based embeddings, so tests need no API keys.
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> docchat_rag::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut v = vec![0.0f32; DIM];
        for (i, x) in v.iter_mut().enumerate() {
            *x = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Always fails, standing in for an unavailable embedding service.
struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    async fn embed(&self, _text: &str) -> docchat_rag::Result<Vec<f32>> {
        Err(RagError::Embedding { provider: "broken".into(), message: "service down".into() })
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
) -> (Arc<InMemoryVectorStore>, IngestionPipeline) {
    let config = RagConfig::builder()
        .chunk_size(1000)
        .chunk_overlap(200)
        .top_k(4)
        .build()
        .unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let gateway = Arc::new(IndexGateway::new(store.clone(), DIM, config.max_top_k));
    let pipeline = IngestionPipeline::builder()
        .config(config)
        .extractor(Arc::new(PlainTextExtractor))
        .chunker(Arc::new(FixedSizeChunker::new(1000, 200)))
        .embedding_provider(embedder)
        .gateway(gateway)
        .build()
        .unwrap();
    (store, pipeline)
}

#[tokio::test]
async fn three_thousand_char_document_yields_four_chunks() {
    let (store, pipeline) = pipeline_with(Arc::new(HashEmbedder));
    let text: String = ('a'..='z').cycle().take(3000).collect();

    let receipt = pipeline.ingest(text.as_bytes(), "lecture.txt", "folder-1").await.unwrap();

    assert_eq!(receipt.document_id, "lecture");
    assert_eq!(receipt.chunk_count, 4);
    assert_eq!(store.collection_len("folder-1").await, 4);
}

#[tokio::test]
async fn reingesting_the_same_document_leaves_one_chunk_per_ordinal() {
    let (store, pipeline) = pipeline_with(Arc::new(HashEmbedder));
    let text: String = ('a'..='z').cycle().take(3000).collect();

    let first = pipeline.ingest(text.as_bytes(), "lecture.txt", "folder-1").await.unwrap();
    let count_after_first = store.collection_len("folder-1").await;

    let second = pipeline.ingest(text.as_bytes(), "lecture.txt", "folder-1").await.unwrap();
    let count_after_second = store.collection_len("folder-1").await;

    assert_eq!(first.document_id, second.document_id);
    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
async fn embedding_failure_leaves_nothing_indexed() {
    let (store, pipeline) = pipeline_with(Arc::new(BrokenEmbedder));

    let err = pipeline.ingest(b"some document text", "doc.txt", "folder-1").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
    assert_eq!(store.collection_len("folder-1").await, 0);
}

#[tokio::test]
async fn unsupported_format_is_an_extraction_error() {
    let (store, pipeline) = pipeline_with(Arc::new(HashEmbedder));

    let err = pipeline.ingest(b"%PDF-1.4 ...", "paper.pdf", "folder-1").await.unwrap_err();
    assert!(matches!(err, RagError::Extraction(_)));
    assert_eq!(store.collection_len("folder-1").await, 0);
}

#[tokio::test]
async fn whitespace_only_upload_is_extraction_degenerate() {
    let (_, pipeline) = pipeline_with(Arc::new(HashEmbedder));
    let err = pipeline.ingest(b"   \n\t  ", "blank.txt", "folder-1").await.unwrap_err();
    assert!(matches!(err, RagError::Extraction(_)));
}

#[tokio::test]
async fn ingested_chunks_are_retrievable_from_their_collection_only() {
    let (_, pipeline) = pipeline_with(Arc::new(HashEmbedder));
    let gateway = pipeline.gateway().clone();

    pipeline.ingest(b"alpha document about rust", "alpha.txt", "folder-a").await.unwrap();
    pipeline.ingest(b"beta document about python", "beta.txt", "folder-b").await.unwrap();

    let query = pipeline.embedding_provider().embed("rust").await.unwrap();
    let results = gateway.search("folder-a", &query, 4).await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.chunk.document_id == "alpha"));
}
