//! Repository port for task and subtask persistence.

use crate::actor::domain::ActorId;
use crate::work_item::domain::{
    AttachmentId, CommentId, ExternalId, Subtask, SubtaskId, Task, TaskId, WorkItemKind,
    WorkItemRef, WorkItemStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for work-item repository operations.
pub type WorkItemRepositoryResult<T> = Result<T, WorkItemRepositoryError>;

/// Selection criteria for listing tasks. An empty filter matches every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks assigned to this manager.
    pub assigned_to: Option<ActorId>,
    /// Only tasks in this status.
    pub status: Option<WorkItemStatus>,
}

impl TaskFilter {
    /// Restricts the filter to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    /// Restricts the filter to one status.
    #[must_use]
    pub const fn with_status(mut self, status: WorkItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` when `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.assigned_to.is_none_or(|id| task.assigned_to() == id)
            && self.status.is_none_or(|status| task.status() == status)
    }
}

/// Selection criteria for listing subtasks. An empty filter matches every
/// subtask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtaskFilter {
    /// Only subtasks under this task.
    pub task_id: Option<TaskId>,
    /// Only subtasks assigned to this actor.
    pub assigned_to: Option<ActorId>,
    /// Only subtasks in this status.
    pub status: Option<WorkItemStatus>,
}

impl SubtaskFilter {
    /// Restricts the filter to one parent task.
    #[must_use]
    pub const fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Restricts the filter to one assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    /// Restricts the filter to one status.
    #[must_use]
    pub const fn with_status(mut self, status: WorkItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` when `subtask` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, subtask: &Subtask) -> bool {
        self.task_id.is_none_or(|id| subtask.task_id() == id)
            && self
                .assigned_to
                .is_none_or(|id| subtask.assigned_to() == Some(id))
            && self.status.is_none_or(|status| subtask.status() == status)
    }
}

/// Records removed by deleting a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedTask {
    /// Subtasks removed with the task.
    pub subtask_ids: Vec<SubtaskId>,
    /// Storage keys of attachments removed with the task or its subtasks.
    pub attachment_keys: Vec<String>,
}

/// Work-item persistence contract.
///
/// Implementations enforce uniqueness of external identifiers per kind and
/// report violations as [`WorkItemRepositoryError::DuplicateExternalId`],
/// distinct from every other write failure.
#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::DuplicateExternalId`] when the
    /// external identifier is taken or [`WorkItemRepositoryError::DuplicateTask`]
    /// when the internal identifier already exists.
    async fn store_task(&self, task: &Task) -> WorkItemRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn update_task(&self, task: &Task) -> WorkItemRepositoryResult<()>;

    /// Finds a task by internal identifier.
    async fn find_task(&self, id: TaskId) -> WorkItemRepositoryResult<Option<Task>>;

    /// Finds a task by external identifier.
    async fn find_task_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Task>>;

    /// Lists tasks matching `filter`, ordered by sequence number.
    async fn list_tasks(&self, filter: TaskFilter) -> WorkItemRepositoryResult<Vec<Task>>;

    /// Deletes a task together with its subtasks, comments, and attachment
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn delete_task(&self, id: TaskId) -> WorkItemRepositoryResult<DeletedTask>;

    /// Stores a new subtask.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::DuplicateExternalId`] when the
    /// external identifier is taken,
    /// [`WorkItemRepositoryError::DuplicateSubtask`] when the internal
    /// identifier already exists, or [`WorkItemRepositoryError::TaskNotFound`]
    /// when the parent task is missing.
    async fn store_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()>;

    /// Persists changes to an existing subtask.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::SubtaskNotFound`] when the subtask
    /// does not exist.
    async fn update_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()>;

    /// Finds a subtask by internal identifier.
    async fn find_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Option<Subtask>>;

    /// Finds a subtask by external identifier.
    async fn find_subtask_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Subtask>>;

    /// Lists subtasks matching `filter`, ordered by sequence number.
    async fn list_subtasks(&self, filter: SubtaskFilter)
    -> WorkItemRepositoryResult<Vec<Subtask>>;

    /// Deletes a subtask with its comments and attachment metadata, returning
    /// the storage keys of removed attachments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemRepositoryError::SubtaskNotFound`] when the subtask
    /// does not exist.
    async fn delete_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Vec<String>>;

    /// Returns the external identifier with the highest sequence number of
    /// `kind`, exactly as stored.
    async fn latest_external_id(&self, kind: WorkItemKind)
    -> WorkItemRepositoryResult<Option<String>>;
}

/// Errors returned by work-item repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkItemRepositoryError {
    /// The external identifier is already in use for its kind.
    #[error("duplicate external identifier: {0}")]
    DuplicateExternalId(ExternalId),

    /// A task with the same internal identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A subtask with the same internal identifier already exists.
    #[error("duplicate subtask identifier: {0}")]
    DuplicateSubtask(SubtaskId),

    /// A comment with the same identifier already exists.
    #[error("duplicate comment identifier: {0}")]
    DuplicateComment(CommentId),

    /// An attachment with the same identifier already exists.
    #[error("duplicate attachment identifier: {0}")]
    DuplicateAttachment(AttachmentId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The subtask was not found.
    #[error("subtask not found: {0}")]
    SubtaskNotFound(SubtaskId),

    /// The work item a comment or attachment refers to was not found.
    #[error("work item not found: {0}")]
    TargetNotFound(WorkItemRef),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkItemRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for uniqueness violations other than the external
    /// identifier; these are caller mistakes and never retried.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTask(_)
                | Self::DuplicateSubtask(_)
                | Self::DuplicateComment(_)
                | Self::DuplicateAttachment(_)
        )
    }
}
