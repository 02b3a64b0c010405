//! Health check handler

use super::AppState;
use crate::catalog::Category;
use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub categories: Vec<Category>,
    pub uptime_seconds: u64,
}

/// `GET /health`. Liveness only; resources are not read.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Performing basic health check");

    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        categories: Category::ALL.to_vec(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
