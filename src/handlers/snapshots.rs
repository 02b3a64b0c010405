//! Snapshot retrieval handler

use super::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;

/// `GET /api/:category`
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.handle(&category).await.map(Json)
}

/// Fallback for paths that are not routed, including `/api/` and nested
/// segments under it
pub async fn invalid_endpoint() -> ApiError {
    ApiError::InvalidEndpoint
}
