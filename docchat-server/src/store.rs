//! Document metadata and object storage collaborators.
//!
//! Both are external concerns specified only at their interface boundary:
//! the metadata store is a simple CRUD collaborator for document records,
//! and the object store holds original file bytes and hands back a
//! retrievable URL. The in-memory implementations serve development,
//! tests, and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Metadata persisted for one ingested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable document ID (matches the chunk identity prefix in the index).
    pub id: String,
    /// The owning collection.
    pub collection_id: String,
    /// Display name of the uploaded file.
    pub name: String,
    /// Upload size in bytes.
    pub byte_size: u64,
    /// How many chunks were indexed for this document.
    pub chunk_count: usize,
    /// When ingestion completed.
    pub ingested_at: DateTime<Utc>,
}

/// CRUD access to document metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a document record.
    async fn put(&self, record: DocumentRecord);

    /// Fetch a document record.
    async fn get(&self, collection_id: &str, document_id: &str) -> Option<DocumentRecord>;

    /// Remove one document record, returning it if it existed.
    async fn remove(&self, collection_id: &str, document_id: &str) -> Option<DocumentRecord>;

    /// Remove every record in a collection, returning the removed records.
    async fn remove_collection(&self, collection_id: &str) -> Vec<DocumentRecord>;

    /// List the records in a collection.
    async fn list(&self, collection_id: &str) -> Vec<DocumentRecord>;
}

/// In-memory document metadata store.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<(String, String), DocumentRecord>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, record: DocumentRecord) {
        let key = (record.collection_id.clone(), record.id.clone());
        self.records.write().await.insert(key, record);
    }

    async fn get(&self, collection_id: &str, document_id: &str) -> Option<DocumentRecord> {
        self.records
            .read()
            .await
            .get(&(collection_id.to_string(), document_id.to_string()))
            .cloned()
    }

    async fn remove(&self, collection_id: &str, document_id: &str) -> Option<DocumentRecord> {
        self.records
            .write()
            .await
            .remove(&(collection_id.to_string(), document_id.to_string()))
    }

    async fn remove_collection(&self, collection_id: &str) -> Vec<DocumentRecord> {
        let mut records = self.records.write().await;
        let keys: Vec<_> =
            records.keys().filter(|(c, _)| c == collection_id).cloned().collect();
        keys.into_iter().filter_map(|k| records.remove(&k)).collect()
    }

    async fn list(&self, collection_id: &str) -> Vec<DocumentRecord> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.collection_id == collection_id)
            .cloned()
            .collect()
    }
}

/// Storage for the original uploaded file bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a file's bytes and return a retrievable URL.
    async fn put(&self, collection_id: &str, name: &str, bytes: &[u8]) -> String;

    /// Remove one stored object.
    async fn remove(&self, collection_id: &str, name: &str);

    /// Remove every object under a collection.
    async fn remove_collection(&self, collection_id: &str);
}

/// In-memory object store issuing synthetic URLs.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    base_url: String,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self { objects: RwLock::new(HashMap::new()), base_url: "memory://objects".to_string() }
    }
}

impl InMemoryObjectStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base used when building object URLs.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, collection_id: &str, name: &str, bytes: &[u8]) -> String {
        let key = (collection_id.to_string(), name.to_string());
        self.objects.write().await.insert(key, bytes.to_vec());
        format!("{}/{collection_id}/{name}", self.base_url)
    }

    async fn remove(&self, collection_id: &str, name: &str) {
        self.objects
            .write()
            .await
            .remove(&(collection_id.to_string(), name.to_string()));
    }

    async fn remove_collection(&self, collection_id: &str) {
        self.objects.write().await.retain(|(c, _), _| c != collection_id);
    }
}
