//! Service layer for creating, assigning, progressing, and deleting tasks and
//! subtasks.

use super::allocation::{AllocationExhausted, ClaimError, ExternalIdAllocator};
use crate::actor::{
    domain::{Actor, ActorId, Role},
    ports::{ActorRepository, ActorRepositoryError},
};
use crate::work_item::{
    domain::{
        AccessError, ExternalId, NewSubtask, NewTask, Priority, Subtask, SubtaskId, Task,
        TaskDetailsUpdate, TaskId, WorkItemAction, WorkItemDomainError, WorkItemKind,
        WorkItemStatus, access,
    },
    ports::{
        DeletedTask, SequenceSource, SubtaskFilter, TaskFilter, WorkItemRepository,
        WorkItemRepositoryError,
    },
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    assignee: ActorId,
    description: Option<String>,
    priority: Priority,
    due_date: Option<NaiveDate>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, assignee: ActorId) -> Self {
        Self {
            title: title.into(),
            assignee,
            description: None,
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Request payload for creating a subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubtaskRequest {
    task_id: TaskId,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assignee: Option<ActorId>,
}

impl CreateSubtaskRequest {
    /// Creates an unassigned subtask request.
    #[must_use]
    pub fn new(task_id: TaskId, title: impl Into<String>) -> Self {
        Self {
            task_id,
            title: title.into(),
            description: None,
            due_date: None,
            assignee: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Assigns the subtask to a staff member at creation.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Tasks and subtasks an actor is allowed to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleWork {
    /// Visible tasks, ordered by sequence.
    pub tasks: Vec<Task>,
    /// Visible subtasks, ordered by sequence.
    pub subtasks: Vec<Subtask>,
}

/// Service-level errors for work-item operations.
#[derive(Debug, Error)]
pub enum WorkItemServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkItemDomainError),
    /// The actor may not perform the operation, or the assignee has the wrong
    /// role.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Every identifier candidate was already taken.
    #[error(transparent)]
    IdAllocationExhausted(#[from] AllocationExhausted),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkItemRepositoryError),
    /// Actor lookup failed.
    #[error(transparent)]
    ActorLookup(#[from] ActorRepositoryError),
    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The subtask was not found.
    #[error("subtask not found: {0}")]
    SubtaskNotFound(SubtaskId),
    /// The referenced actor was not found.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),
}

impl WorkItemServiceError {
    /// Returns `true` when repeating the request unchanged may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IdAllocationExhausted(_)
                | Self::Repository(WorkItemRepositoryError::Persistence(_))
                | Self::ActorLookup(ActorRepositoryError::Persistence(_))
        )
    }

    /// Returns `true` for authorisation refusals.
    #[must_use]
    pub const fn is_authorization_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Access(AccessError::AuthorizationMismatch { .. })
        )
    }

    /// Returns `true` for uniqueness violations the caller must correct.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        match self {
            Self::Repository(err) => err.is_duplicate_key(),
            _ => false,
        }
    }
}

impl ClaimError for WorkItemServiceError {
    fn taken_external_id(&self) -> Option<ExternalId> {
        match self {
            Self::Repository(WorkItemRepositoryError::DuplicateExternalId(taken)) => Some(*taken),
            _ => None,
        }
    }
}

/// Result type for work-item service operations.
pub type WorkItemServiceResult<T> = Result<T, WorkItemServiceError>;

/// Work-item orchestration service.
pub struct WorkItemService<R, A, S, C>
where
    R: WorkItemRepository,
    A: ActorRepository,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    actors: Arc<A>,
    allocator: ExternalIdAllocator<S>,
    clock: Arc<C>,
}

impl<R, A, S, C> Clone for WorkItemService<R, A, S, C>
where
    R: WorkItemRepository,
    A: ActorRepository,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            actors: Arc::clone(&self.actors),
            allocator: self.allocator.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, A, S, C> WorkItemService<R, A, S, C>
where
    R: WorkItemRepository,
    A: ActorRepository,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    /// Creates a new work-item service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        actors: Arc<A>,
        allocator: ExternalIdAllocator<S>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            actors,
            allocator,
            clock,
        }
    }

    /// Creates a task and assigns it to a manager.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] when the performer is not an
    /// administrator or the assignee is not a manager,
    /// [`WorkItemServiceError::IdAllocationExhausted`] when no free
    /// identifier was found within the attempt bound, or a domain/repository
    /// error.
    pub async fn create_task(
        &self,
        performed_by: &Actor,
        request: CreateTaskRequest,
    ) -> WorkItemServiceResult<Task> {
        access::ensure_can_create_task(performed_by)?;
        let CreateTaskRequest {
            title,
            assignee,
            description,
            priority,
            due_date,
        } = request;
        access::ensure_task_assignee(&self.load_actor(assignee).await?)?;

        let mut draft = NewTask::new(title, performed_by.id(), assignee)?.with_priority(priority);
        if let Some(text) = description {
            draft = draft.with_description(text);
        }
        if let Some(date) = due_date {
            draft = draft.with_due_date(date);
        }

        let task = self
            .allocator
            .allocate_with(WorkItemKind::Task, |external_id| {
                let candidate = Task::create(draft.clone(), external_id, &*self.clock);
                let repository = Arc::clone(&self.repository);
                async move {
                    let task = candidate?;
                    repository.store_task(&task).await?;
                    Ok::<_, WorkItemServiceError>(task)
                }
            })
            .await?;
        info!(
            task_id = %task.id(),
            external_id = %task.external_id(),
            assigned_to = %task.assigned_to(),
            created_by = %performed_by.id(),
            "created task"
        );
        Ok(task)
    }

    /// Creates a subtask under a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::TaskNotFound`] for an unknown parent,
    /// [`WorkItemServiceError::Access`] unless the performer is an
    /// administrator or the manager assigned to the parent, or when the
    /// assignee is not staff, and
    /// [`WorkItemServiceError::IdAllocationExhausted`] when no free
    /// identifier was found.
    pub async fn create_subtask(
        &self,
        performed_by: &Actor,
        request: CreateSubtaskRequest,
    ) -> WorkItemServiceResult<Subtask> {
        let CreateSubtaskRequest {
            task_id,
            title,
            description,
            due_date,
            assignee,
        } = request;
        let parent = self.load_task(task_id).await?;
        access::ensure_can_create_subtask(performed_by, &parent)?;

        let mut draft = NewSubtask::new(task_id, title, performed_by.id())?;
        if let Some(text) = description {
            draft = draft.with_description(text);
        }
        if let Some(date) = due_date {
            draft = draft.with_due_date(date);
        }
        if let Some(assignee_id) = assignee {
            access::ensure_subtask_assignee(&self.load_actor(assignee_id).await?)?;
            draft = draft.with_assignee(assignee_id);
        }

        let subtask = self
            .allocator
            .allocate_with(WorkItemKind::Subtask, |external_id| {
                let candidate = Subtask::create(draft.clone(), external_id, &*self.clock);
                let repository = Arc::clone(&self.repository);
                async move {
                    let subtask = candidate?;
                    repository.store_subtask(&subtask).await?;
                    Ok::<_, WorkItemServiceError>(subtask)
                }
            })
            .await?;
        info!(
            subtask_id = %subtask.id(),
            external_id = %subtask.external_id(),
            task_id = %task_id,
            created_by = %performed_by.id(),
            "created subtask"
        );
        Ok(subtask)
    }

    /// Changes a task's status. The first move to
    /// [`WorkItemStatus::Completed`] stamps the completion time.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] unless the performer is an
    /// administrator or the assigned manager; the task is unchanged.
    pub async fn change_task_status(
        &self,
        performed_by: &Actor,
        task_id: TaskId,
        status: WorkItemStatus,
    ) -> WorkItemServiceResult<Task> {
        let mut task = self.load_task(task_id).await?;
        access::ensure_can_change_task_status(performed_by, &task)?;
        let change = task.transition_status(status, &*self.clock);
        self.repository.update_task(&task).await?;
        info!(
            task_id = %task_id,
            from = %change.from,
            to = %change.to,
            first_completion = change.first_completion,
            changed_by = %performed_by.id(),
            "changed task status"
        );
        Ok(task)
    }

    /// Reassigns a task to another manager.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] for non-administrators or a
    /// non-manager assignee.
    pub async fn reassign_task(
        &self,
        performed_by: &Actor,
        task_id: TaskId,
        assignee: ActorId,
    ) -> WorkItemServiceResult<Task> {
        access::ensure_task_admin(performed_by, WorkItemAction::ReassignTask)?;
        let mut task = self.load_task(task_id).await?;
        access::ensure_task_assignee(&self.load_actor(assignee).await?)?;
        task.reassign(assignee, &*self.clock);
        self.repository.update_task(&task).await?;
        info!(task_id = %task_id, assigned_to = %assignee, "reassigned task");
        Ok(task)
    }

    /// Updates a task's title, description, priority, or due date.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] for non-administrators or a
    /// domain error for an invalid title.
    pub async fn update_task_details(
        &self,
        performed_by: &Actor,
        task_id: TaskId,
        update: TaskDetailsUpdate,
    ) -> WorkItemServiceResult<Task> {
        access::ensure_task_admin(performed_by, WorkItemAction::EditTask)?;
        let mut task = self.load_task(task_id).await?;
        task.update_details(update, &*self.clock)?;
        self.repository.update_task(&task).await?;
        Ok(task)
    }

    /// Deletes a task together with its subtasks and their collaboration
    /// records.
    ///
    /// The returned attachment keys name blobs that no longer have metadata;
    /// pass them to the collaboration service to discard them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] for non-administrators or
    /// [`WorkItemServiceError::TaskNotFound`].
    pub async fn delete_task(
        &self,
        performed_by: &Actor,
        task_id: TaskId,
    ) -> WorkItemServiceResult<DeletedTask> {
        access::ensure_task_admin(performed_by, WorkItemAction::DeleteTask)?;
        let deleted = self
            .repository
            .delete_task(task_id)
            .await
            .map_err(|err| match err {
                WorkItemRepositoryError::TaskNotFound(id) => {
                    WorkItemServiceError::TaskNotFound(id)
                }
                other => other.into(),
            })?;
        info!(
            task_id = %task_id,
            subtasks_removed = deleted.subtask_ids.len(),
            deleted_by = %performed_by.id(),
            "deleted task"
        );
        Ok(deleted)
    }

    /// Assigns, reassigns, or clears a subtask's assignee.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] unless the performer is an
    /// administrator or the subtask's creator, or when the assignee is not
    /// staff.
    pub async fn assign_subtask(
        &self,
        performed_by: &Actor,
        subtask_id: SubtaskId,
        assignee: Option<ActorId>,
    ) -> WorkItemServiceResult<Subtask> {
        let mut subtask = self.load_subtask(subtask_id).await?;
        access::ensure_can_manage_subtask(performed_by, &subtask, WorkItemAction::AssignSubtask)?;
        if let Some(assignee_id) = assignee {
            access::ensure_subtask_assignee(&self.load_actor(assignee_id).await?)?;
        }
        subtask.assign(assignee, &*self.clock);
        self.repository.update_subtask(&subtask).await?;
        info!(
            subtask_id = %subtask_id,
            assigned_to = ?assignee,
            assigned_by = %performed_by.id(),
            "assigned subtask"
        );
        Ok(subtask)
    }

    /// Changes a subtask's status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] unless the performer is an
    /// administrator, the subtask's creator, or its assignee; the subtask is
    /// unchanged.
    pub async fn change_subtask_status(
        &self,
        performed_by: &Actor,
        subtask_id: SubtaskId,
        status: WorkItemStatus,
    ) -> WorkItemServiceResult<Subtask> {
        let mut subtask = self.load_subtask(subtask_id).await?;
        access::ensure_can_change_subtask_status(performed_by, &subtask)?;
        let change = subtask.transition_status(status, &*self.clock);
        self.repository.update_subtask(&subtask).await?;
        info!(
            subtask_id = %subtask_id,
            from = %change.from,
            to = %change.to,
            first_completion = change.first_completion,
            changed_by = %performed_by.id(),
            "changed subtask status"
        );
        Ok(subtask)
    }

    /// Deletes a subtask and its collaboration records, returning the storage
    /// keys of removed attachments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] unless the performer is an
    /// administrator or the subtask's creator.
    pub async fn delete_subtask(
        &self,
        performed_by: &Actor,
        subtask_id: SubtaskId,
    ) -> WorkItemServiceResult<Vec<String>> {
        let subtask = self.load_subtask(subtask_id).await?;
        access::ensure_can_manage_subtask(performed_by, &subtask, WorkItemAction::DeleteSubtask)?;
        let keys = self.repository.delete_subtask(subtask_id).await?;
        info!(subtask_id = %subtask_id, deleted_by = %performed_by.id(), "deleted subtask");
        Ok(keys)
    }

    /// Returns a task the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::TaskNotFound`] or
    /// [`WorkItemServiceError::Access`] when the task is outside the actor's
    /// view.
    pub async fn get_task(&self, viewer: &Actor, task_id: TaskId) -> WorkItemServiceResult<Task> {
        let task = self.load_task(task_id).await?;
        self.ensure_task_visible(viewer, &task).await?;
        Ok(task)
    }

    /// Returns a task by external identifier if the actor may see it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Access`] when the task is outside the
    /// actor's view.
    pub async fn find_task_by_external_id(
        &self,
        viewer: &Actor,
        external_id: ExternalId,
    ) -> WorkItemServiceResult<Option<Task>> {
        let Some(task) = self.repository.find_task_by_external_id(external_id).await? else {
            return Ok(None);
        };
        self.ensure_task_visible(viewer, &task).await?;
        Ok(Some(task))
    }

    /// Returns a subtask the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::SubtaskNotFound`] or
    /// [`WorkItemServiceError::Access`] when the subtask is outside the
    /// actor's view.
    pub async fn get_subtask(
        &self,
        viewer: &Actor,
        subtask_id: SubtaskId,
    ) -> WorkItemServiceResult<Subtask> {
        let subtask = self.load_subtask(subtask_id).await?;
        let parent = self.load_task(subtask.task_id()).await?;
        access::ensure_visible(
            viewer,
            access::can_view_subtask(viewer, &parent, &subtask),
            WorkItemAction::View,
        )?;
        Ok(subtask)
    }

    /// Lists the tasks the actor may see, optionally narrowed to a status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Repository`] when the lookup fails.
    pub async fn list_tasks(
        &self,
        viewer: &Actor,
        status: Option<WorkItemStatus>,
    ) -> WorkItemServiceResult<Vec<Task>> {
        let mut tasks = self.visible_work(viewer).await?.tasks;
        if let Some(wanted) = status {
            tasks.retain(|task| task.status() == wanted);
        }
        Ok(tasks)
    }

    /// Lists the subtasks of a task that the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::TaskNotFound`] or
    /// [`WorkItemServiceError::Access`] when the parent task is outside the
    /// actor's view.
    pub async fn list_subtasks(
        &self,
        viewer: &Actor,
        task_id: TaskId,
    ) -> WorkItemServiceResult<Vec<Subtask>> {
        let parent = self.load_task(task_id).await?;
        self.ensure_task_visible(viewer, &parent).await?;
        let subtasks = self
            .repository
            .list_subtasks(SubtaskFilter::default().with_task(task_id))
            .await?;
        Ok(subtasks
            .into_iter()
            .filter(|subtask| access::can_view_subtask(viewer, &parent, subtask))
            .collect())
    }

    /// Collects every task and subtask the actor may see.
    ///
    /// Administrators see everything, managers see their tasks and the
    /// subtasks under them, and staff see their subtasks plus the parent
    /// tasks.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemServiceError::Repository`] when a lookup fails.
    pub async fn visible_work(&self, viewer: &Actor) -> WorkItemServiceResult<VisibleWork> {
        let work = match viewer.role() {
            Role::Admin => VisibleWork {
                tasks: self.repository.list_tasks(TaskFilter::default()).await?,
                subtasks: self
                    .repository
                    .list_subtasks(SubtaskFilter::default())
                    .await?,
            },
            Role::Manager => {
                let tasks = self
                    .repository
                    .list_tasks(TaskFilter::default().with_assignee(viewer.id()))
                    .await?;
                let mut subtasks = Vec::new();
                for task in &tasks {
                    subtasks.extend(
                        self.repository
                            .list_subtasks(SubtaskFilter::default().with_task(task.id()))
                            .await?,
                    );
                }
                subtasks.sort_by_key(|subtask| subtask.external_id().sequence());
                VisibleWork { tasks, subtasks }
            }
            Role::Staff => {
                let subtasks = self
                    .repository
                    .list_subtasks(SubtaskFilter::default().with_assignee(viewer.id()))
                    .await?;
                let parent_ids: BTreeSet<_> = subtasks
                    .iter()
                    .map(|subtask| subtask.task_id().into_inner())
                    .collect();
                let mut tasks = Vec::with_capacity(parent_ids.len());
                for parent_id in parent_ids {
                    if let Some(task) = self
                        .repository
                        .find_task(TaskId::from_uuid(parent_id))
                        .await?
                    {
                        tasks.push(task);
                    }
                }
                tasks.sort_by_key(|task| task.external_id().sequence());
                VisibleWork { tasks, subtasks }
            }
        };
        Ok(work)
    }

    async fn ensure_task_visible(&self, viewer: &Actor, task: &Task) -> WorkItemServiceResult<()> {
        let holds_subtask = if viewer.role() == Role::Staff {
            !self
                .repository
                .list_subtasks(
                    SubtaskFilter::default()
                        .with_task(task.id())
                        .with_assignee(viewer.id()),
                )
                .await?
                .is_empty()
        } else {
            false
        };
        access::ensure_visible(
            viewer,
            access::can_view_task(viewer, task, holds_subtask),
            WorkItemAction::View,
        )?;
        Ok(())
    }

    async fn load_task(&self, task_id: TaskId) -> WorkItemServiceResult<Task> {
        self.repository
            .find_task(task_id)
            .await?
            .ok_or(WorkItemServiceError::TaskNotFound(task_id))
    }

    async fn load_subtask(&self, subtask_id: SubtaskId) -> WorkItemServiceResult<Subtask> {
        self.repository
            .find_subtask(subtask_id)
            .await?
            .ok_or(WorkItemServiceError::SubtaskNotFound(subtask_id))
    }

    async fn load_actor(&self, actor_id: ActorId) -> WorkItemServiceResult<Actor> {
        self.actors
            .find_by_id(actor_id)
            .await?
            .ok_or(WorkItemServiceError::ActorNotFound(actor_id))
    }
}
