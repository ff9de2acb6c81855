//! Error types for the resource cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the resource cache and its HTTP surface.
///
/// A cache miss is not an error: `CacheStore::get` reports it as `None`.
/// `NotFound` is only produced by the outer layers (HTTP, providers).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Payload exceeds the per-resource cap; nothing was stored
    #[error("Resource {id} too large ({size} bytes), max allowed: {max}")]
    OversizedResource { id: String, size: usize, max: usize },

    /// Budget cannot be satisfied even after eligible eviction; nothing was stored
    #[error("Cannot make space for resource {id} ({required} bytes)")]
    InsufficientCapacity { id: String, required: usize },

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The resource provider failed to deliver a payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::OversizedResource { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::InsufficientCapacity { .. } => StatusCode::INSUFFICIENT_STORAGE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Provider(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the resource cache.
pub type Result<T> = std::result::Result<T, CacheError>;
