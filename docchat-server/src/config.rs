//! Environment-driven server configuration.

use anyhow::{Context, Result};

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Bearer token accepted by the API.
    pub api_token: String,
    /// Key for the OpenAI-compatible embedding and generation endpoints.
    pub openai_api_key: String,
    /// Override for the OpenAI-compatible base URL.
    pub openai_base_url: Option<String>,
    /// Embedding model name, or `None` for the provider default.
    pub embedding_model: Option<String>,
    /// Generation model name, or `None` for the provider default.
    pub chat_model: Option<String>,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Chunk overlap in characters.
    pub chunk_overlap: usize,
    /// How many chunks to retrieve per question.
    pub top_k: usize,
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} must be a positive integer")),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// `DOCCHAT_API_TOKEN` and `OPENAI_API_KEY` are required; everything
    /// else has a default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: std::env::var("DOCCHAT_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_token: std::env::var("DOCCHAT_API_TOKEN")
                .context("DOCCHAT_API_TOKEN environment variable not set")?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY environment variable not set")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            embedding_model: std::env::var("DOCCHAT_EMBEDDING_MODEL").ok(),
            chat_model: std::env::var("DOCCHAT_CHAT_MODEL").ok(),
            chunk_size: env_usize("DOCCHAT_CHUNK_SIZE", 1000)?,
            chunk_overlap: env_usize("DOCCHAT_CHUNK_OVERLAP", 200)?,
            top_k: env_usize("DOCCHAT_TOP_K", 4)?,
        })
    }
}
