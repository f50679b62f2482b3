//! Attachment blobs stored as files under one capability-scoped directory.

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use crate::work_item::ports::{AttachmentStore, AttachmentStoreError, AttachmentStoreResult};

/// Longest accepted storage key.
const MAX_KEY_LEN: usize = 128;

/// Filesystem [`AttachmentStore`] rooted at a single directory.
///
/// All access goes through a [`Dir`] capability, so keys cannot escape the
/// root even if validation were bypassed. Keys are flat file names made of
/// ASCII alphanumerics, `-`, and `_`.
#[derive(Debug, Clone)]
pub struct CapStdAttachmentStore {
    root: Arc<Dir>,
}

impl CapStdAttachmentStore {
    /// Opens an existing directory as the store root.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::Io`] when the directory cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> AttachmentStoreResult<Self> {
        let root = Dir::open_ambient_dir(path.as_ref(), ambient_authority())
            .map_err(AttachmentStoreError::io)?;
        Ok(Self::from_dir(root))
    }

    /// Wraps an already-open directory capability.
    #[must_use]
    pub fn from_dir(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AttachmentStoreResult<T>
    where
        F: FnOnce(&Dir) -> AttachmentStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || f(&root))
            .await
            .map_err(AttachmentStoreError::io)?
    }
}

fn validate_key(key: &str) -> AttachmentStoreResult<String> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_');
    if valid {
        Ok(key.to_owned())
    } else {
        Err(AttachmentStoreError::InvalidKey(key.to_owned()))
    }
}

#[async_trait]
impl AttachmentStore for CapStdAttachmentStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> AttachmentStoreResult<()> {
        let name = validate_key(key)?;
        let contents = bytes.to_vec();
        self.run_blocking(move |root| {
            let mut options = OpenOptions::new();
            options.write(true).create_new(true);
            let mut file = root.open_with(&name, &options).map_err(|err| {
                if err.kind() == ErrorKind::AlreadyExists {
                    AttachmentStoreError::AlreadyExists(name.clone())
                } else {
                    AttachmentStoreError::io(err)
                }
            })?;
            file.write_all(&contents).map_err(AttachmentStoreError::io)?;
            file.sync_all().map_err(AttachmentStoreError::io)
        })
        .await
    }

    async fn get(&self, key: &str) -> AttachmentStoreResult<Vec<u8>> {
        let name = validate_key(key)?;
        self.run_blocking(move |root| match root.read(&name) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(AttachmentStoreError::NotFound(name))
            }
            Err(err) => Err(AttachmentStoreError::io(err)),
        })
        .await
    }

    async fn remove(&self, key: &str) -> AttachmentStoreResult<()> {
        let name = validate_key(key)?;
        self.run_blocking(move |root| match root.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AttachmentStoreError::io(err)),
        })
        .await
    }
}
