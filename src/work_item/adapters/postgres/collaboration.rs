//! `PostgreSQL` storage for comments and attachment metadata.

use super::{
    models::{AttachmentRow, CommentRow},
    repository::PostgresWorkItemRepository,
    schema::{attachments, comments},
};
use crate::actor::domain::ActorId;
use crate::work_item::{
    domain::{
        Attachment, AttachmentFileName, AttachmentId, Comment, CommentBody, CommentId,
        PersistedAttachmentData, PersistedCommentData, SubtaskId, TaskId, WorkItemRef,
    },
    ports::{CollaborationRepository, WorkItemRepositoryError, WorkItemRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

const fn target_columns(target: WorkItemRef) -> (Option<Uuid>, Option<Uuid>) {
    match target {
        WorkItemRef::Task(id) => (Some(id.into_inner()), None),
        WorkItemRef::Subtask(id) => (None, Some(id.into_inner())),
    }
}

fn target_from_columns(
    task_id: Option<Uuid>,
    subtask_id: Option<Uuid>,
) -> WorkItemRepositoryResult<WorkItemRef> {
    match (task_id, subtask_id) {
        (Some(id), None) => Ok(WorkItemRef::Task(TaskId::from_uuid(id))),
        (None, Some(id)) => Ok(WorkItemRef::Subtask(SubtaskId::from_uuid(id))),
        _ => Err(WorkItemRepositoryError::persistence(std::io::Error::other(
            "record must reference exactly one work item",
        ))),
    }
}

fn map_insert_error(
    err: DieselError,
    target: WorkItemRef,
    duplicate: WorkItemRepositoryError,
) -> WorkItemRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
            if info
                .constraint_name()
                .is_some_and(|name| name.ends_with("task_id_fkey")) =>
        {
            WorkItemRepositoryError::TargetNotFound(target)
        }
        _ => WorkItemRepositoryError::persistence(err),
    }
}

#[async_trait]
impl CollaborationRepository for PostgresWorkItemRepository {
    async fn store_comment(&self, comment: &Comment) -> WorkItemRepositoryResult<()> {
        let target = comment.target();
        let comment_id = comment.id();
        let (task_id, subtask_id) = target_columns(target);
        let row = CommentRow {
            id: comment_id.into_inner(),
            task_id,
            subtask_id,
            author_id: comment.author().into_inner(),
            body: comment.body().as_str().to_owned(),
            created_at: comment.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(comments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    map_insert_error(
                        err,
                        target,
                        WorkItemRepositoryError::DuplicateComment(comment_id),
                    )
                })?;
            Ok(())
        })
        .await
    }

    async fn list_comments(&self, target: WorkItemRef) -> WorkItemRepositoryResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let query = comments::table
                .order(comments::created_at.asc())
                .select(CommentRow::as_select())
                .into_boxed();
            let filtered = match target {
                WorkItemRef::Task(id) => query.filter(comments::task_id.eq(id.into_inner())),
                WorkItemRef::Subtask(id) => {
                    query.filter(comments::subtask_id.eq(id.into_inner()))
                }
            };
            let rows = filtered
                .load::<CommentRow>(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }

    async fn store_attachment(&self, attachment: &Attachment) -> WorkItemRepositoryResult<()> {
        let target = attachment.target();
        let attachment_id = attachment.id();
        let (task_id, subtask_id) = target_columns(target);
        let row = AttachmentRow {
            id: attachment_id.into_inner(),
            task_id,
            subtask_id,
            file_name: attachment.file_name().as_str().to_owned(),
            content_type: attachment.content_type().to_owned(),
            size_bytes: i64::try_from(attachment.size_bytes())
                .map_err(WorkItemRepositoryError::persistence)?,
            checksum: attachment.checksum().to_owned(),
            storage_key: attachment.storage_key().to_owned(),
            uploaded_by: attachment.uploaded_by().into_inner(),
            uploaded_at: attachment.uploaded_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(attachments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    map_insert_error(
                        err,
                        target,
                        WorkItemRepositoryError::DuplicateAttachment(attachment_id),
                    )
                })?;
            Ok(())
        })
        .await
    }

    async fn find_attachment(
        &self,
        id: AttachmentId,
    ) -> WorkItemRepositoryResult<Option<Attachment>> {
        self.run_blocking(move |connection| {
            let row = attachments::table
                .find(id.into_inner())
                .select(AttachmentRow::as_select())
                .first::<AttachmentRow>(connection)
                .optional()
                .map_err(WorkItemRepositoryError::persistence)?;
            row.map(row_to_attachment).transpose()
        })
        .await
    }

    async fn list_attachments(
        &self,
        target: WorkItemRef,
    ) -> WorkItemRepositoryResult<Vec<Attachment>> {
        self.run_blocking(move |connection| {
            let query = attachments::table
                .order(attachments::uploaded_at.asc())
                .select(AttachmentRow::as_select())
                .into_boxed();
            let filtered = match target {
                WorkItemRef::Task(id) => query.filter(attachments::task_id.eq(id.into_inner())),
                WorkItemRef::Subtask(id) => {
                    query.filter(attachments::subtask_id.eq(id.into_inner()))
                }
            };
            let rows = filtered
                .load::<AttachmentRow>(connection)
                .map_err(WorkItemRepositoryError::persistence)?;
            rows.into_iter().map(row_to_attachment).collect()
        })
        .await
    }
}

fn row_to_comment(row: CommentRow) -> WorkItemRepositoryResult<Comment> {
    let body = CommentBody::new(row.body).map_err(WorkItemRepositoryError::persistence)?;
    Ok(Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        target: target_from_columns(row.task_id, row.subtask_id)?,
        author: ActorId::from_uuid(row.author_id),
        body,
        created_at: row.created_at,
    }))
}

fn row_to_attachment(row: AttachmentRow) -> WorkItemRepositoryResult<Attachment> {
    let file_name =
        AttachmentFileName::new(row.file_name).map_err(WorkItemRepositoryError::persistence)?;
    let size_bytes = u64::try_from(row.size_bytes).map_err(WorkItemRepositoryError::persistence)?;
    Ok(Attachment::from_persisted(PersistedAttachmentData {
        id: AttachmentId::from_uuid(row.id),
        target: target_from_columns(row.task_id, row.subtask_id)?,
        file_name,
        content_type: row.content_type,
        size_bytes,
        checksum: row.checksum,
        storage_key: row.storage_key,
        uploaded_by: ActorId::from_uuid(row.uploaded_by),
        uploaded_at: row.uploaded_at,
    }))
}
