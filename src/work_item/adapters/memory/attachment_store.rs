//! In-memory blob store for attachment tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::work_item::ports::{AttachmentStore, AttachmentStoreError, AttachmentStoreResult};

/// Thread-safe in-memory [`AttachmentStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachmentStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAttachmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when a blob exists under `key`.
    ///
    /// A poisoned lock reads as empty.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(key))
            .unwrap_or(false)
    }

    /// Returns the number of stored blobs; a poisoned lock reads as empty.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    /// Returns `true` when no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(err: impl std::fmt::Display) -> AttachmentStoreError {
    AttachmentStoreError::io(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> AttachmentStoreResult<()> {
        let mut blobs = self.blobs.write().map_err(lock_error)?;
        if blobs.contains_key(key) {
            return Err(AttachmentStoreError::AlreadyExists(key.to_owned()));
        }
        blobs.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> AttachmentStoreResult<Vec<u8>> {
        let blobs = self.blobs.read().map_err(lock_error)?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| AttachmentStoreError::NotFound(key.to_owned()))
    }

    async fn remove(&self, key: &str) -> AttachmentStoreResult<()> {
        let mut blobs = self.blobs.write().map_err(lock_error)?;
        blobs.remove(key);
        Ok(())
    }
}
