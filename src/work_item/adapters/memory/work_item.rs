//! In-memory repository for tasks, subtasks, and their collaboration records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::work_item::{
    domain::{
        Attachment, AttachmentId, Comment, ExternalId, Subtask, SubtaskId, Task, TaskId,
        WorkItemKind, WorkItemRef,
    },
    ports::{
        CollaborationRepository, DeletedTask, SubtaskFilter, TaskFilter, WorkItemRepository,
        WorkItemRepositoryError, WorkItemRepositoryResult,
    },
};

/// Thread-safe in-memory work-item repository.
///
/// Implements both [`WorkItemRepository`] and [`CollaborationRepository`]
/// over one shared state so deletes cascade the way foreign keys do in
/// `PostgreSQL`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkItemRepository {
    state: Arc<RwLock<InMemoryWorkItemState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkItemState {
    tasks: HashMap<TaskId, Task>,
    task_index: HashMap<ExternalId, TaskId>,
    subtasks: HashMap<SubtaskId, Subtask>,
    subtask_index: HashMap<ExternalId, SubtaskId>,
    comments: Vec<Comment>,
    attachments: Vec<Attachment>,
}

impl InMemoryWorkItemState {
    fn target_exists(&self, target: WorkItemRef) -> bool {
        match target {
            WorkItemRef::Task(id) => self.tasks.contains_key(&id),
            WorkItemRef::Subtask(id) => self.subtasks.contains_key(&id),
        }
    }

    fn remove_records_for(&mut self, targets: &[WorkItemRef]) -> Vec<String> {
        self.comments
            .retain(|comment| !targets.contains(&comment.target()));
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .attachments
            .drain(..)
            .partition(|attachment| targets.contains(&attachment.target()));
        self.attachments = kept;
        removed
            .iter()
            .map(|attachment| attachment.storage_key().to_owned())
            .collect()
    }
}

impl InMemoryWorkItemRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> WorkItemRepositoryError {
    WorkItemRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl WorkItemRepository for InMemoryWorkItemRepository {
    async fn store_task(&self, task: &Task) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.task_index.contains_key(&task.external_id()) {
            return Err(WorkItemRepositoryError::DuplicateExternalId(
                task.external_id(),
            ));
        }
        if state.tasks.contains_key(&task.id()) {
            return Err(WorkItemRepositoryError::DuplicateTask(task.id()));
        }

        state.task_index.insert(task.external_id(), task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(WorkItemRepositoryError::TaskNotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> WorkItemRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_task_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .task_index
            .get(&external_id)
            .and_then(|id| state.tasks.get(id))
            .cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> WorkItemRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.external_id().sequence());
        Ok(tasks)
    }

    async fn delete_task(&self, id: TaskId) -> WorkItemRepositoryResult<DeletedTask> {
        let mut state = self.state.write().map_err(lock_error)?;
        let task = state
            .tasks
            .remove(&id)
            .ok_or(WorkItemRepositoryError::TaskNotFound(id))?;
        state.task_index.remove(&task.external_id());

        let orphaned: Vec<Subtask> = state
            .subtasks
            .values()
            .filter(|subtask| subtask.task_id() == id)
            .cloned()
            .collect();
        let mut targets = vec![WorkItemRef::Task(id)];
        let mut subtask_ids = Vec::with_capacity(orphaned.len());
        for subtask in orphaned {
            state.subtasks.remove(&subtask.id());
            state.subtask_index.remove(&subtask.external_id());
            targets.push(WorkItemRef::Subtask(subtask.id()));
            subtask_ids.push(subtask.id());
        }

        let attachment_keys = state.remove_records_for(&targets);
        Ok(DeletedTask {
            subtask_ids,
            attachment_keys,
        })
    }

    async fn store_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.tasks.contains_key(&subtask.task_id()) {
            return Err(WorkItemRepositoryError::TaskNotFound(subtask.task_id()));
        }
        if state.subtask_index.contains_key(&subtask.external_id()) {
            return Err(WorkItemRepositoryError::DuplicateExternalId(
                subtask.external_id(),
            ));
        }
        if state.subtasks.contains_key(&subtask.id()) {
            return Err(WorkItemRepositoryError::DuplicateSubtask(subtask.id()));
        }

        state
            .subtask_index
            .insert(subtask.external_id(), subtask.id());
        state.subtasks.insert(subtask.id(), subtask.clone());
        Ok(())
    }

    async fn update_subtask(&self, subtask: &Subtask) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .subtasks
            .get_mut(&subtask.id())
            .ok_or(WorkItemRepositoryError::SubtaskNotFound(subtask.id()))?;
        *stored = subtask.clone();
        Ok(())
    }

    async fn find_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Option<Subtask>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.subtasks.get(&id).cloned())
    }

    async fn find_subtask_by_external_id(
        &self,
        external_id: ExternalId,
    ) -> WorkItemRepositoryResult<Option<Subtask>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .subtask_index
            .get(&external_id)
            .and_then(|id| state.subtasks.get(id))
            .cloned())
    }

    async fn list_subtasks(
        &self,
        filter: SubtaskFilter,
    ) -> WorkItemRepositoryResult<Vec<Subtask>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut subtasks: Vec<Subtask> = state
            .subtasks
            .values()
            .filter(|subtask| filter.matches(subtask))
            .cloned()
            .collect();
        subtasks.sort_by_key(|subtask| subtask.external_id().sequence());
        Ok(subtasks)
    }

    async fn delete_subtask(&self, id: SubtaskId) -> WorkItemRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(lock_error)?;
        let subtask = state
            .subtasks
            .remove(&id)
            .ok_or(WorkItemRepositoryError::SubtaskNotFound(id))?;
        state.subtask_index.remove(&subtask.external_id());
        Ok(state.remove_records_for(&[WorkItemRef::Subtask(id)]))
    }

    async fn latest_external_id(
        &self,
        kind: WorkItemKind,
    ) -> WorkItemRepositoryResult<Option<String>> {
        let state = self.state.read().map_err(lock_error)?;
        let latest = match kind {
            WorkItemKind::Task => state.task_index.keys().max_by_key(|id| id.sequence()),
            WorkItemKind::Subtask => state.subtask_index.keys().max_by_key(|id| id.sequence()),
        };
        Ok(latest.map(ToString::to_string))
    }
}

#[async_trait]
impl CollaborationRepository for InMemoryWorkItemRepository {
    async fn store_comment(&self, comment: &Comment) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.target_exists(comment.target()) {
            return Err(WorkItemRepositoryError::TargetNotFound(comment.target()));
        }
        if state.comments.iter().any(|stored| stored.id() == comment.id()) {
            return Err(WorkItemRepositoryError::DuplicateComment(comment.id()));
        }
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(&self, target: WorkItemRef) -> WorkItemRepositoryResult<Vec<Comment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|comment| comment.target() == target)
            .cloned()
            .collect();
        comments.sort_by_key(Comment::created_at);
        Ok(comments)
    }

    async fn store_attachment(&self, attachment: &Attachment) -> WorkItemRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.target_exists(attachment.target()) {
            return Err(WorkItemRepositoryError::TargetNotFound(attachment.target()));
        }
        if state
            .attachments
            .iter()
            .any(|stored| stored.id() == attachment.id())
        {
            return Err(WorkItemRepositoryError::DuplicateAttachment(attachment.id()));
        }
        state.attachments.push(attachment.clone());
        Ok(())
    }

    async fn find_attachment(
        &self,
        id: AttachmentId,
    ) -> WorkItemRepositoryResult<Option<Attachment>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .attachments
            .iter()
            .find(|attachment| attachment.id() == id)
            .cloned())
    }

    async fn list_attachments(
        &self,
        target: WorkItemRef,
    ) -> WorkItemRepositoryResult<Vec<Attachment>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut attachments: Vec<Attachment> = state
            .attachments
            .iter()
            .filter(|attachment| attachment.target() == target)
            .cloned()
            .collect();
        attachments.sort_by_key(Attachment::uploaded_at);
        Ok(attachments)
    }
}
