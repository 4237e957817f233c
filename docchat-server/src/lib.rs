//! # docchat-server
//!
//! The HTTP boundary of DocChat. Exposes document ingestion, chat, and
//! collection teardown over a small JSON API, enforcing authentication
//! before any pipeline work and mapping internal failures to short,
//! non-technical responses.
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `POST /api/ingest` — upload one document into a collection
//! - `POST /api/chat` — answer a question against a collection
//! - `GET /api/collections/{collection_id}/documents` — list a collection
//! - `DELETE /api/collections/{collection_id}`
//! - `DELETE /api/collections/{collection_id}/documents/{document_id}`

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{Authenticator, StaticTokenAuthenticator, UserId, bearer_token};
pub use config::ServerConfig;
pub use error::{ApiError, CHAT_FALLBACK};
pub use routes::router;
pub use state::AppState;
pub use store::{
    DocumentRecord, DocumentStore, InMemoryDocumentStore, InMemoryObjectStore, ObjectStore,
};
