//! API error mapping.
//!
//! Internal error detail is logged, never returned: callers always see a
//! short, non-technical message and an appropriate status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use docchat_rag::RagError;

/// Fallback answer text returned when a chat request fails internally.
pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error processing your request.";

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid identity; rejected before any pipeline work.
    #[error("unauthorized")]
    Unauthorized,

    /// The request is missing or malformed; nothing was attempted.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested document or collection does not exist.
    #[error("not found")]
    NotFound,

    /// The uploaded file could not be read as a document.
    #[error("could not read file")]
    CouldNotReadFile,

    /// A chat request failed internally; detail was already logged.
    #[error("chat failed")]
    ChatFailed,

    /// Anything else; detail was already logged.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Map an ingestion-path failure, logging the technical detail.
    pub fn from_ingest(err: &RagError) -> Self {
        tracing::error!(error = %err, "ingestion failed");
        match err {
            RagError::Extraction(_) => ApiError::CouldNotReadFile,
            _ => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
            ApiError::CouldNotReadFile => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": "Could not read file" }))
            }
            ApiError::ChatFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "response": CHAT_FALLBACK }),
            ),
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal server error" }))
            }
        };
        (status, Json(body)).into_response()
    }
}
