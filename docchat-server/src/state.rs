//! Shared application state.

use std::sync::Arc;

use docchat_chat::ChatOrchestrator;
use docchat_rag::{IndexGateway, IngestionPipeline};

use crate::auth::Authenticator;
use crate::store::{DocumentStore, ObjectStore};

/// Dependencies shared by every handler.
///
/// Everything here is immutable or internally synchronized; requests share
/// no mutable state with each other, so handlers run fully in parallel.
#[derive(Clone)]
pub struct AppState {
    /// Identity verification collaborator.
    pub auth: Arc<dyn Authenticator>,
    /// Document metadata collaborator.
    pub documents: Arc<dyn DocumentStore>,
    /// Original-file storage collaborator.
    pub objects: Arc<dyn ObjectStore>,
    /// The write path: extract → chunk → embed → upsert.
    pub pipeline: Arc<IngestionPipeline>,
    /// Namespace-scoped index access, used for teardown.
    pub gateway: Arc<IndexGateway>,
    /// The read path: retrieve → generate.
    pub orchestrator: Arc<ChatOrchestrator>,
}
