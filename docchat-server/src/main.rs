use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docchat_chat::{ChatConfig, ChatOrchestrator, OpenAIChatClient};
use docchat_rag::{
    EmbeddingProvider, FixedSizeChunker, IndexGateway, IngestionPipeline, InMemoryVectorStore,
    OpenAIEmbeddingProvider, PlainTextExtractor, RagConfig,
};
use docchat_server::{
    AppState, InMemoryDocumentStore, InMemoryObjectStore, ServerConfig, StaticTokenAuthenticator,
    router,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let mut embedder = OpenAIEmbeddingProvider::new(config.openai_api_key.clone())?;
    if let Some(url) = &config.openai_base_url {
        embedder = embedder.with_base_url(url.clone());
    }
    if let Some(model) = &config.embedding_model {
        embedder = embedder.with_model(model.clone());
    }
    let embedder = Arc::new(embedder);

    let mut chat_client = OpenAIChatClient::new(config.openai_api_key.clone())?;
    if let Some(url) = &config.openai_base_url {
        chat_client = chat_client.with_base_url(url.clone());
    }
    if let Some(model) = &config.chat_model {
        chat_client = chat_client.with_model(model.clone());
    }

    let rag_config = RagConfig::builder()
        .chunk_size(config.chunk_size)
        .chunk_overlap(config.chunk_overlap)
        .top_k(config.top_k)
        .build()?;

    let gateway = Arc::new(IndexGateway::new(
        Arc::new(InMemoryVectorStore::new()),
        embedder.dimensions(),
        rag_config.max_top_k,
    ));

    let pipeline = IngestionPipeline::builder()
        .config(rag_config.clone())
        .extractor(Arc::new(PlainTextExtractor))
        .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)))
        .embedding_provider(embedder.clone())
        .gateway(gateway.clone())
        .build()?;

    let orchestrator = ChatOrchestrator::builder()
        .config(ChatConfig { top_k: rag_config.top_k, ..ChatConfig::default() })
        .embedding_provider(embedder)
        .gateway(gateway.clone())
        .generation_client(Arc::new(chat_client))
        .build()?;

    let state = AppState {
        auth: Arc::new(StaticTokenAuthenticator::single(config.api_token.clone(), "api-user")),
        documents: Arc::new(InMemoryDocumentStore::new()),
        objects: Arc::new(InMemoryObjectStore::new()),
        pipeline: Arc::new(pipeline),
        gateway,
        orchestrator: Arc::new(orchestrator),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "docchat server listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
