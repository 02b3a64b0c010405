//! Handlers module for the snapshot API
//!
//! Routes:
//! - `GET /api/:category` serves the stored snapshot for a category; a
//!   single trailing slash is accepted
//! - `GET /health` reports liveness and the served categories
//!
//! Every other path answers with the invalid-endpoint error.

pub mod health;
pub mod snapshots;

use crate::config::Config;
use crate::service::RetrievalService;
use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use health::{health_check, HealthResponse};
pub use snapshots::{get_snapshot, invalid_endpoint};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: RetrievalService,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: RetrievalService) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Routes only, no middleware
pub fn create_router(state: AppState) -> Router {
    // Non-GET methods on a category path get the same JSON 404 as unknown paths
    let snapshot = get(get_snapshot).fallback(invalid_endpoint);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/:category", snapshot.clone())
        .route("/api/:category/", snapshot)
        .fallback(invalid_endpoint)
        .with_state(state)
}

/// Routes wrapped in the CORS, tracing and timeout layers
pub fn create_app(state: AppState, config: &Config) -> Result<Router> {
    let cors = cors_layer(config)?;

    Ok(create_router(state)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// CORS policy for the dashboard origin(s)
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .server
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_rejects_unparsable_origin() {
        let mut config = Config::default();
        config.server.cors_origins = vec!["http://ok.example".to_string(), "bad\norigin".to_string()];
        assert!(cors_layer(&config).is_err());
    }

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let mut config = Config::default();
        config.server.cors_origins = vec!["http://localhost:3000".to_string()];
        assert!(cors_layer(&config).is_ok());
    }
}
