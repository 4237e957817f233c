//! Authentication collaborator.
//!
//! The core treats identity as a precondition: every ingestion and query
//! request must resolve to a verified user before any pipeline work
//! begins. The trait hides whatever identity provider a deployment uses;
//! [`StaticTokenAuthenticator`] covers deployments with pre-issued tokens
//! and doubles as the test implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// A verified user identity.
pub type UserId = String;

/// Resolves a bearer token to a verified user identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Return the verified user for a bearer token, or `None` if the token
    /// is missing, unknown, or invalid.
    async fn authenticate(&self, bearer_token: Option<&str>) -> Option<UserId>;
}

/// Authenticator over a fixed token → user map.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuthenticator {
    /// Create an authenticator from a token → user map.
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }

    /// Create an authenticator accepting a single token for a single user.
    pub fn single(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self { tokens: HashMap::from([(token.into(), user.into())]) }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, bearer_token: Option<&str>) -> Option<UserId> {
        bearer_token.and_then(|t| self.tokens.get(t).cloned())
    }
}

/// Extract the bearer token from request headers, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
