//! Backing storage for snapshot resources
//!
//! The API only ever reads from storage. Resources are addressed by the
//! key the catalog derives for a category (`"{category}.json"`).
//!
//! The file store reads each resource in a single whole-file read. Writers
//! must publish through [`publish_atomic`] (temp file + rename in the same
//! directory) so that a concurrent reader observes either the previous or
//! the new complete version, never a partial one.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Failure to read a resource from backing storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("resource not found: {key}")]
    NotFound { key: String },

    #[error("failed to read resource {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key } | Self::Io { key, .. } => key,
        }
    }
}

/// Read-only key to bytes store
#[async_trait]
pub trait BackingStorage: Send + Sync {
    /// Load the complete bytes of the resource stored under `key`
    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Human-readable location of this store, used in logs
    fn describe(&self) -> String;
}

/// Resources stored as files in a single data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BackingStorage for FileStorage {
    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key);
        debug!("Reading resource {} from {}", key, path.display());

        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::Io {
                    key: key.to_string(),
                    source,
                }
            }
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }
}

/// Fixed in-memory store, populated at construction
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource<K, B>(mut self, key: K, bytes: B) -> Self
    where
        K: Into<String>,
        B: Into<Vec<u8>>,
    {
        self.resources.insert(key.into(), bytes.into());
        self
    }
}

#[async_trait]
impl BackingStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.resources
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("memory:{} resources", self.resources.len())
    }
}

/// Replace the file at `path` with `bytes` in one rename
pub fn publish_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    Ok(())
}
