//! HTTP routes for ingestion, chat, and collection management.

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use docchat_chat::{ConversationTurn, Role};

use crate::auth::{UserId, bearer_token};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::DocumentRecord;

/// Maximum accepted request body, which bounds upload size.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/ingest", post(ingest))
        .route("/api/chat", post(chat))
        .route("/api/collections/{collection_id}", delete(delete_collection))
        .route("/api/collections/{collection_id}/documents", get(list_documents))
        .route(
            "/api/collections/{collection_id}/documents/{document_id}",
            delete(delete_document),
        )
        // axum's own 2 MB default would preempt the tower-http limit.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserId, ApiError> {
    state
        .auth
        .authenticate(bearer_token(headers))
        .await
        .ok_or(ApiError::Unauthorized)
}

// ── Health ─────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Ingestion ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Display name of the uploaded file, extension included.
    pub file_name: String,
    /// The raw file bytes, base64-encoded.
    pub content_base64: String,
    /// The collection (folder) to ingest into.
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub document_url: String,
    pub document_name: String,
}

async fn ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    if req.file_name.trim().is_empty() || req.collection_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing file or collection ID".into()));
    }
    if req.content_base64.is_empty() {
        return Err(ApiError::BadRequest("Missing file content".into()));
    }

    let bytes = BASE64
        .decode(&req.content_base64)
        .map_err(|_| ApiError::BadRequest("File content is not valid base64".into()))?;

    info!(
        user,
        collection_id = %req.collection_id,
        file_name = %req.file_name,
        byte_size = bytes.len(),
        "ingest request"
    );

    let document_url = state.objects.put(&req.collection_id, &req.file_name, &bytes).await;

    let receipt = state
        .pipeline
        .ingest(&bytes, &req.file_name, &req.collection_id)
        .await
        .map_err(|e| ApiError::from_ingest(&e))?;

    state
        .documents
        .put(DocumentRecord {
            id: receipt.document_id,
            collection_id: req.collection_id,
            name: req.file_name.clone(),
            byte_size: bytes.len() as u64,
            chunk_count: receipt.chunk_count,
            ingested_at: Utc::now(),
        })
        .await;

    Ok(Json(IngestResponse { document_url, document_name: req.file_name }))
}

// ── Chat ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TurnPayload {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The current user question.
    pub message: String,
    /// The collection (folder) to answer from.
    pub collection_id: String,
    /// Prior conversation turns in chronological order. Transcript storage
    /// is the caller's concern; the server persists nothing.
    #[serde(default)]
    pub history: Vec<TurnPayload>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    if req.message.trim().is_empty() || req.collection_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing message or collection ID".into()));
    }

    info!(
        user,
        collection_id = %req.collection_id,
        history_len = req.history.len(),
        "chat request"
    );

    let history: Vec<ConversationTurn> = req
        .history
        .into_iter()
        .map(|t| ConversationTurn::new(t.role, t.content))
        .collect();

    let answer = state
        .orchestrator
        .answer(&req.collection_id, &req.message, &history)
        .await
        .map_err(|e| {
            error!(collection_id = %req.collection_id, error = %e, "chat request failed");
            ApiError::ChatFailed
        })?;

    let response =
        if answer.is_empty() { "No response generated".to_string() } else { answer };

    Ok(Json(ChatResponse { response }))
}

// ── Collection contents and teardown ───────────────────────────────

async fn list_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(collection_id): Path<String>,
) -> Result<Json<Vec<DocumentRecord>>, ApiError> {
    require_user(&state, &headers).await?;
    Ok(Json(state.documents.list(&collection_id).await))
}

async fn delete_collection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(collection_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = require_user(&state, &headers).await?;

    // Index first: if this fails the metadata stays intact and the caller
    // can retry without stranding vectors.
    state.gateway.delete_namespace(&collection_id).await.map_err(|e| {
        error!(collection_id, error = %e, "namespace teardown failed");
        ApiError::Internal
    })?;

    let removed = state.documents.remove_collection(&collection_id).await;
    state.objects.remove_collection(&collection_id).await;

    info!(user, collection_id, removed = removed.len(), "collection deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((collection_id, document_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let user = require_user(&state, &headers).await?;

    let Some(record) = state.documents.get(&collection_id, &document_id).await else {
        return Err(ApiError::NotFound);
    };

    state.gateway.delete_document(&collection_id, &document_id).await.map_err(|e| {
        error!(collection_id, document_id, error = %e, "document chunk removal failed");
        ApiError::Internal
    })?;

    state.documents.remove(&collection_id, &document_id).await;
    state.objects.remove(&collection_id, &record.name).await;

    info!(user, collection_id, document_id, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}
