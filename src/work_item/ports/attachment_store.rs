//! Port for attachment blob storage.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for attachment store operations.
pub type AttachmentStoreResult<T> = Result<T, AttachmentStoreError>;

/// Byte storage for uploaded files, addressed by opaque keys.
///
/// Keys are generated by the caller and never derived from user input.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Writes `bytes` under `key`, replacing nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::AlreadyExists`] when the key is taken.
    async fn put(&self, key: &str, bytes: &[u8]) -> AttachmentStoreResult<()>;

    /// Reads the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::NotFound`] for unknown keys.
    async fn get(&self, key: &str) -> AttachmentStoreResult<Vec<u8>>;

    /// Removes the bytes stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::Io`] when the backend fails.
    async fn remove(&self, key: &str) -> AttachmentStoreResult<()>;
}

/// Errors returned by attachment stores.
#[derive(Debug, Clone, Error)]
pub enum AttachmentStoreError {
    /// The key is not a valid storage key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A blob already exists under the key.
    #[error("blob already exists: {0}")]
    AlreadyExists(String),

    /// No blob exists under the key.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// Backend failure.
    #[error("attachment store error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl AttachmentStoreError {
    /// Wraps a backend error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
