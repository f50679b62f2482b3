//! Repository port for comments and attachment metadata.

use super::WorkItemRepositoryResult;
use crate::work_item::domain::{Attachment, AttachmentId, Comment, WorkItemRef};
use async_trait::async_trait;

/// Persistence contract for records hanging off a work item.
///
/// Records are removed together with the work item they target.
#[async_trait]
pub trait CollaborationRepository: Send + Sync {
    /// Stores a comment.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkItemRepositoryError::TargetNotFound`] when the
    /// commented work item does not exist.
    async fn store_comment(&self, comment: &Comment) -> WorkItemRepositoryResult<()>;

    /// Lists comments on a work item, oldest first.
    async fn list_comments(&self, target: WorkItemRef) -> WorkItemRepositoryResult<Vec<Comment>>;

    /// Stores attachment metadata.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkItemRepositoryError::TargetNotFound`] when the
    /// work item does not exist.
    async fn store_attachment(&self, attachment: &Attachment) -> WorkItemRepositoryResult<()>;

    /// Finds attachment metadata by identifier.
    async fn find_attachment(
        &self,
        id: AttachmentId,
    ) -> WorkItemRepositoryResult<Option<Attachment>>;

    /// Lists attachments on a work item, oldest first.
    async fn list_attachments(
        &self,
        target: WorkItemRef,
    ) -> WorkItemRepositoryResult<Vec<Attachment>>;
}
