//! Namespace-scoped access to the vector index.
//!
//! Every chunk written and every search issued goes through the
//! [`IndexGateway`], which is the only component allowed to touch the
//! [`VectorStore`] backend. The gateway owns the core isolation invariant:
//! a query against one namespace can never surface a chunk written under
//! another.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Metadata key under which the gateway stamps the owning namespace.
const NAMESPACE_KEY: &str = "namespace";

/// Namespace-enforcing facade over a [`VectorStore`] backend.
///
/// Namespaces map 1:1 to backend collections. On write the gateway stamps
/// the namespace into each chunk's metadata; on read it re-checks the stamp
/// and drops (and logs) anything foreign, so isolation does not depend on
/// caller discipline or backend behavior.
pub struct IndexGateway {
    store: Arc<dyn VectorStore>,
    dimensions: usize,
    max_top_k: usize,
}

impl IndexGateway {
    /// Create a gateway over the given backend.
    ///
    /// `dimensions` is the embedding dimensionality used when collections
    /// are created implicitly; `max_top_k` caps every search's result size.
    pub fn new(store: Arc<dyn VectorStore>, dimensions: usize, max_top_k: usize) -> Self {
        Self { store, dimensions, max_top_k }
    }

    fn require_namespace(namespace: &str) -> Result<()> {
        if namespace.trim().is_empty() {
            return Err(RagError::Index {
                backend: "gateway".into(),
                message: "namespace must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Upsert chunks under a namespace.
    ///
    /// The namespace's collection is created implicitly on first write.
    /// Upsert is idempotent per chunk identity (`{document_id}_{ordinal}`):
    /// re-ingesting a document overwrites its chunks rather than
    /// duplicating them.
    pub async fn upsert(&self, namespace: &str, chunks: &[Chunk]) -> Result<()> {
        Self::require_namespace(namespace)?;
        if chunks.is_empty() {
            return Ok(());
        }

        let mut stamped = chunks.to_vec();
        for chunk in &mut stamped {
            chunk.metadata.insert(NAMESPACE_KEY.to_string(), namespace.to_string());
        }

        self.store.create_collection(namespace, self.dimensions).await?;
        self.store.upsert(namespace, &stamped).await?;

        debug!(namespace, count = stamped.len(), "upserted chunks");
        Ok(())
    }

    /// Search a namespace for the `k` chunks most similar to `query_vector`.
    ///
    /// `k` is capped at the configured upper bound. Results arrive ordered
    /// by descending similarity; any result not stamped with the requesting
    /// namespace is dropped and reported, since it indicates an isolation
    /// fault in the backend.
    pub async fn search(
        &self,
        namespace: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        Self::require_namespace(namespace)?;
        let k = k.min(self.max_top_k);

        let results = self.store.search(namespace, query_vector, k).await?;

        let mut checked = Vec::with_capacity(results.len());
        for result in results {
            match result.chunk.metadata.get(NAMESPACE_KEY) {
                Some(ns) if ns == namespace => checked.push(result),
                other => {
                    error!(
                        namespace,
                        chunk_id = %result.chunk.id,
                        found = other.map(String::as_str).unwrap_or("<unstamped>"),
                        "dropped search result from foreign namespace"
                    );
                }
            }
        }

        debug!(namespace, k, returned = checked.len(), "search complete");
        Ok(checked)
    }

    /// Remove every chunk belonging to one document from a namespace.
    pub async fn delete_document(&self, namespace: &str, document_id: &str) -> Result<()> {
        Self::require_namespace(namespace)?;
        self.store.delete_by_document(namespace, document_id).await?;
        info!(namespace, document_id, "deleted document chunks");
        Ok(())
    }

    /// Tear down a namespace and all chunks indexed under it.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        Self::require_namespace(namespace)?;
        self.store.delete_collection(namespace).await?;
        info!(namespace, "deleted namespace");
        Ok(())
    }
}
