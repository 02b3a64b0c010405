//! Retrieval service: category name in, parsed snapshot out

use crate::catalog::{self, Category};
use crate::error::{ApiError, ApiResult, LoadError};
use crate::storage::BackingStorage;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Serves catalog resources out of a backing store.
///
/// Holds no mutable state; clones share the same storage handle and may
/// be used from any number of concurrent requests.
#[derive(Clone)]
pub struct RetrievalService {
    storage: Arc<dyn BackingStorage>,
}

impl RetrievalService {
    pub fn new(storage: Arc<dyn BackingStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn BackingStorage {
        self.storage.as_ref()
    }

    /// Resolve `category_name` and return the stored JSON unmodified
    pub async fn handle(&self, category_name: &str) -> ApiResult<Value> {
        let category = Category::from_name(category_name).ok_or(ApiError::InvalidEndpoint)?;

        self.load(category)
            .await
            .map_err(|source| ApiError::ResourceUnavailable { category, source })
    }

    /// Load and parse the resource bound to `category`
    pub async fn load(&self, category: Category) -> Result<Value, LoadError> {
        let key = catalog::resource_key_for(category);
        let bytes = self.storage.load(key).await?;
        let value = serde_json::from_slice(&bytes)?;
        debug!("Loaded {} ({} bytes)", key, bytes.len());
        Ok(value)
    }
}
