//! Error handling for the snapshot API
//! Maps retrieval failures onto the fixed HTTP error contract

use crate::catalog::Category;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Why a stored resource could not be served
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors returned from the retrieval endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid endpoint")]
    InvalidEndpoint,

    #[error("Failed to load {}", .category.resource_key())]
    ResourceUnavailable {
        category: Category,
        #[source]
        source: LoadError,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEndpoint => StatusCode::NOT_FOUND,
            Self::ResourceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing body. Never includes the underlying cause.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidEndpoint => {
                debug!("Rejected request for unknown category");
            }
            ApiError::ResourceUnavailable { category, source } => {
                error!("Error reading {}: {}", category.resource_key(), source);
            }
        }

        (self.status_code(), Json(self.to_error_response())).into_response()
    }
}

/// Result type alias for retrieval operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;
