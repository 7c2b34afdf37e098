//! Error types for the cache-aside accessor
//!
//! Collaborator failures (cache, backing store) and the accessor's own
//! error surface, all built with thiserror.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::catalog::ProductId;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failure reported by a cache store.
///
/// The accessor recovers from these locally: reads fail open to the
/// backing store and failed invalidations degrade to TTL-bounded staleness.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Cache store could not be reached or refused the call
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Key or value rejected by the cache store limits
    #[error("Invalid cache request: {0}")]
    InvalidRequest(String),
}

// == Store Error Enum ==
/// Failure reported by the backing store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

// == Operation ==
/// Accessor operation, carried in errors for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

// == Access Error Enum ==
/// Errors surfaced to callers of the accessor.
#[derive(Error, Debug)]
pub enum AccessError {
    /// No product with this identifier exists in the backing store
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Field updates were empty, named an unknown field, or had a wrong type
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// Backing store call failed; never recovered locally
    #[error("Backing store failed during {operation} of product {id}: {source}")]
    StoreUnavailable {
        id: ProductId,
        operation: Operation,
        #[source]
        source: StoreError,
    },

    /// The task running the operation panicked or was shut down
    #[error("{operation} of product {id} was interrupted: {reason}")]
    Interrupted {
        id: ProductId,
        operation: Operation,
        reason: String,
    },
}

// == IntoResponse Implementation ==
impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccessError::NotFound(_) => StatusCode::NOT_FOUND,
            AccessError::InvalidUpdate(_) => StatusCode::BAD_REQUEST,
            AccessError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AccessError::Interrupted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result of a cache store call.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result of a backing store call.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenience Result type for accessor operations.
pub type Result<T> = std::result::Result<T, AccessError>;
