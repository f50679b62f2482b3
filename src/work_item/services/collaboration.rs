//! Service layer for comments and attachments on work items.

use super::lifecycle::{WorkItemService, WorkItemServiceError};
use crate::actor::{domain::Actor, ports::ActorRepository};
use crate::config::{AttachmentConfig, DEFAULT_MAX_ATTACHMENT_BYTES};
use crate::work_item::{
    domain::{
        Attachment, AttachmentFileName, AttachmentId, Comment, CommentBody, NewAttachment,
        WorkItemDomainError, WorkItemRef,
    },
    ports::{
        AttachmentStore, AttachmentStoreError, CollaborationRepository, SequenceSource,
        WorkItemRepository, WorkItemRepositoryError,
    },
};
use mockable::Clock;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Request payload for uploading an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAttachmentRequest {
    target: WorkItemRef,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl UploadAttachmentRequest {
    /// Creates an upload request.
    #[must_use]
    pub fn new(
        target: impl Into<WorkItemRef>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            target: target.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Attachment metadata together with its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAttachment {
    /// Metadata.
    pub attachment: Attachment,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Service-level errors for collaboration operations.
#[derive(Debug, Error)]
pub enum CollaborationError {
    /// Work-item lookup or authorisation failed.
    #[error(transparent)]
    WorkItem(#[from] WorkItemServiceError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkItemDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkItemRepositoryError),
    /// Blob storage failed.
    #[error(transparent)]
    Store(#[from] AttachmentStoreError),
    /// The upload exceeds the configured size limit.
    #[error("attachment is {actual} bytes, limit is {limit}")]
    TooLarge {
        /// Configured limit.
        limit: u64,
        /// Upload size.
        actual: u64,
    },
    /// The attachment was not found.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(AttachmentId),
    /// Stored bytes no longer match the recorded checksum.
    #[error("attachment {0} failed checksum verification")]
    ChecksumMismatch(AttachmentId),
}

/// Result type for collaboration service operations.
pub type CollaborationResult<T> = Result<T, CollaborationError>;

/// Comment and attachment service.
///
/// Every operation first resolves the target through the work-item service,
/// so the same visibility rules apply to collaboration records as to the
/// work items themselves.
#[derive(Clone)]
pub struct CollaborationService<R, A, S, B, C>
where
    R: WorkItemRepository + CollaborationRepository,
    A: ActorRepository,
    S: SequenceSource,
    B: AttachmentStore,
    C: Clock + Send + Sync,
{
    work_items: WorkItemService<R, A, S, C>,
    repository: Arc<R>,
    store: Arc<B>,
    clock: Arc<C>,
    max_bytes: u64,
}

impl<R, A, S, B, C> CollaborationService<R, A, S, B, C>
where
    R: WorkItemRepository + CollaborationRepository,
    A: ActorRepository,
    S: SequenceSource,
    B: AttachmentStore,
    C: Clock + Send + Sync,
{
    /// Creates a collaboration service with the default upload limit.
    #[must_use]
    pub const fn new(
        work_items: WorkItemService<R, A, S, C>,
        repository: Arc<R>,
        store: Arc<B>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            work_items,
            repository,
            store,
            clock,
            max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }

    /// Applies the upload limit from configuration.
    #[must_use]
    pub const fn with_config(mut self, config: &AttachmentConfig) -> Self {
        self.max_bytes = config.max_bytes;
        self
    }

    /// Adds a comment to a work item the author may see.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationError::WorkItem`] when the target is missing or
    /// hidden from the author, or [`CollaborationError::Domain`] for an empty
    /// or overlong body.
    pub async fn add_comment(
        &self,
        author: &Actor,
        target: impl Into<WorkItemRef> + Send,
        body: impl Into<String> + Send,
    ) -> CollaborationResult<Comment> {
        let target_ref = target.into();
        self.ensure_visible(author, target_ref).await?;
        let comment = Comment::new(target_ref, author.id(), CommentBody::new(body)?, &*self.clock);
        self.repository.store_comment(&comment).await?;
        info!(
            comment_id = %comment.id(),
            target = %target_ref,
            author = %author.id(),
            "added comment"
        );
        Ok(comment)
    }

    /// Lists comments on a work item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationError::WorkItem`] when the target is missing or
    /// hidden from the viewer.
    pub async fn list_comments(
        &self,
        viewer: &Actor,
        target: impl Into<WorkItemRef> + Send,
    ) -> CollaborationResult<Vec<Comment>> {
        let target_ref = target.into();
        self.ensure_visible(viewer, target_ref).await?;
        Ok(self.repository.list_comments(target_ref).await?)
    }

    /// Stores an uploaded file and records its metadata.
    ///
    /// The blob is written first under a generated key; if recording the
    /// metadata fails the blob is removed again.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationError::TooLarge`] above the size limit,
    /// [`CollaborationError::Domain`] for a bad file name or content type,
    /// [`CollaborationError::WorkItem`] when the target is missing or hidden,
    /// or a store/repository error.
    pub async fn upload_attachment(
        &self,
        uploader: &Actor,
        request: UploadAttachmentRequest,
    ) -> CollaborationResult<Attachment> {
        let UploadAttachmentRequest {
            target,
            file_name: raw_file_name,
            content_type,
            bytes,
        } = request;
        let file_name = AttachmentFileName::new(raw_file_name)?;
        let size_bytes = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size_bytes > self.max_bytes {
            return Err(CollaborationError::TooLarge {
                limit: self.max_bytes,
                actual: size_bytes,
            });
        }
        self.ensure_visible(uploader, target).await?;

        let storage_key = Uuid::new_v4().simple().to_string();
        let attachment = Attachment::new(
            NewAttachment {
                target,
                file_name,
                content_type,
                size_bytes,
                checksum: sha256_hex(&bytes),
                storage_key: storage_key.clone(),
                uploaded_by: uploader.id(),
            },
            &*self.clock,
        )?;

        self.store.put(&storage_key, &bytes).await?;
        if let Err(err) = self.repository.store_attachment(&attachment).await {
            if let Err(cleanup) = self.store.remove(&storage_key).await {
                warn!(
                    storage_key = %storage_key,
                    error = %cleanup,
                    "failed to remove blob after metadata write failure"
                );
            }
            return Err(err.into());
        }
        info!(
            attachment_id = %attachment.id(),
            target = %target,
            size_bytes,
            uploaded_by = %uploader.id(),
            "stored attachment"
        );
        Ok(attachment)
    }

    /// Lists attachments on a work item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationError::WorkItem`] when the target is missing or
    /// hidden from the viewer.
    pub async fn list_attachments(
        &self,
        viewer: &Actor,
        target: impl Into<WorkItemRef> + Send,
    ) -> CollaborationResult<Vec<Attachment>> {
        let target_ref = target.into();
        self.ensure_visible(viewer, target_ref).await?;
        Ok(self.repository.list_attachments(target_ref).await?)
    }

    /// Returns an attachment's metadata and bytes, verifying the checksum.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationError::AttachmentNotFound`],
    /// [`CollaborationError::WorkItem`] when the owning work item is hidden
    /// from the viewer, or [`CollaborationError::ChecksumMismatch`] when the
    /// stored bytes were altered.
    pub async fn download_attachment(
        &self,
        viewer: &Actor,
        attachment_id: AttachmentId,
    ) -> CollaborationResult<DownloadedAttachment> {
        let attachment = self
            .repository
            .find_attachment(attachment_id)
            .await?
            .ok_or(CollaborationError::AttachmentNotFound(attachment_id))?;
        self.ensure_visible(viewer, attachment.target()).await?;
        let bytes = self.store.get(attachment.storage_key()).await?;
        if sha256_hex(&bytes) != attachment.checksum() {
            return Err(CollaborationError::ChecksumMismatch(attachment_id));
        }
        Ok(DownloadedAttachment { attachment, bytes })
    }

    /// Removes blobs whose metadata was deleted with a task or subtask.
    ///
    /// Failures are logged and skipped; the number of removed blobs is
    /// returned.
    pub async fn discard_blobs(&self, storage_keys: &[String]) -> usize {
        let mut removed = 0;
        for key in storage_keys {
            match self.store.remove(key).await {
                Ok(()) => removed += 1,
                Err(err) => warn!(storage_key = %key, error = %err, "failed to discard blob"),
            }
        }
        removed
    }

    async fn ensure_visible(&self, actor: &Actor, target: WorkItemRef) -> CollaborationResult<()> {
        match target {
            WorkItemRef::Task(id) => {
                self.work_items.get_task(actor, id).await?;
            }
            WorkItemRef::Subtask(id) => {
                self.work_items.get_subtask(actor, id).await?;
            }
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
