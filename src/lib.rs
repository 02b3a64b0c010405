//! SIEM Snapshot API Library
//!
//! Serves pre-generated security telemetry snapshots (logins, devices,
//! locations, compromise indicators, Suricata rules, reports) to the
//! dashboard as JSON.
//!
//! # Modules
//!
//! - `catalog`: the closed set of categories and their storage keys
//! - `storage`: read-only backing storage (files, memory)
//! - `service`: category lookup, load and parse
//! - `error`: HTTP error contract
//! - `handlers`: axum router, CORS and tracing layers
//! - `config`: TOML configuration with environment overrides
//! - `rulebook`: builds the `suricata_rules` snapshot from a rule book

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rulebook;
pub mod service;
pub mod storage;

// Re-export the main types for convenience
pub use catalog::Category;
pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorResponse, LoadError};
pub use handlers::{create_app, create_router, AppState};
pub use service::RetrievalService;
pub use storage::{BackingStorage, FileStorage, MemoryStorage, StorageError};
