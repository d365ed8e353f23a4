//! Error types for the cache manager
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
/// Unified error type for the cache manager and its HTTP front end.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An empty key was supplied where one is required
    #[error("key not set")]
    KeyNotSet,

    /// An empty deletion pattern was supplied
    #[error("key pattern not set")]
    KeyPatternNotSet,

    /// Strict lookup missed
    #[error("key does not exist: {0}")]
    KeyDoesNotExist(String),

    /// The store could not hold the entry
    #[error("value for key {key} does not fit in the store ({size} bytes)")]
    ValueTooLarge { key: String, size: usize },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyNotSet | CacheError::KeyPatternNotSet => StatusCode::BAD_REQUEST,
            CacheError::KeyDoesNotExist(_) => StatusCode::NOT_FOUND,
            CacheError::ValueTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache manager.
pub type Result<T> = std::result::Result<T, CacheError>;
