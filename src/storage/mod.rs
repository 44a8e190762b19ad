//! Object storage for uploaded file bytes.
//!
//! The intake workflow only needs `store(bytes, key, content_type) -> url` and a way to read the
//! bytes back; [`LocalObjectStorage`] provides both on the local filesystem and hands out URLs
//! under the service's own `/files/` route.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors raised by object storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key was empty, absolute, or escaped the storage root.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    /// No object stored under the key.
    #[error("Object not found: {0}")]
    NotFound(String),
    /// Filesystem operation failed.
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Capability that persists file bytes and returns a retrievable URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` and return the URL they can be fetched from.
    async fn store(
        &self,
        bytes: &[u8],
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Read the bytes stored under `key`.
    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Public URL for `key`.
    fn url_for(&self, key: &str) -> String;
}

/// Filesystem-backed [`ObjectStorage`].
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    /// Store objects below `root`, advertising them under `{public_base_url}/files/`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn store(
        &self,
        bytes: &[u8],
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let path = self.resolve(key)?;
        let io_error = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, bytes).await.map_err(io_error)?;
        tracing::debug!(key, bytes = bytes.len(), content_type = ?content_type, "Stored object");
        Ok(self.url_for(key))
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io {
                    key: key.to_string(),
                    source,
                }
            }
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/files/{}", self.public_base_url, key)
    }
}
