//! Subtask aggregate.

use super::{
    ExternalId, Progress, StatusChange, SubtaskId, TaskId, WorkItemDomainError, WorkItemKind,
    WorkItemStatus,
    task::{ensure_kind, normalize_description, normalize_title},
};
use crate::actor::domain::ActorId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated subtask fields awaiting an external identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubtask {
    task_id: TaskId,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    created_by: ActorId,
    assigned_to: Option<ActorId>,
}

impl NewSubtask {
    /// Creates an unassigned subtask draft.
    ///
    /// # Errors
    ///
    /// Returns a title validation error.
    pub fn new(
        task_id: TaskId,
        title: impl Into<String>,
        created_by: ActorId,
    ) -> Result<Self, WorkItemDomainError> {
        Ok(Self {
            task_id,
            title: normalize_title(title.into())?,
            description: None,
            due_date: None,
            created_by,
            assigned_to: None,
        })
    }

    /// Sets the description; blank text clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Assigns the subtask at creation.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<ActorId> {
        self.assigned_to
    }
}

/// Subtask record under a parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    external_id: ExternalId,
    task_id: TaskId,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    created_by: ActorId,
    assigned_to: Option<ActorId>,
    progress: Progress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubtaskData {
    /// Persisted subtask identifier.
    pub id: SubtaskId,
    /// Persisted external identifier.
    pub external_id: ExternalId,
    /// Persisted parent task.
    pub task_id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted creator.
    pub created_by: ActorId,
    /// Persisted assignee.
    pub assigned_to: Option<ActorId>,
    /// Persisted status and completion time.
    pub progress: Progress,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Subtask {
    /// Creates a pending subtask from a draft and its allocated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::KindMismatch`] when `external_id` is not
    /// a subtask identifier.
    pub fn create(
        draft: NewSubtask,
        external_id: ExternalId,
        clock: &impl Clock,
    ) -> Result<Self, WorkItemDomainError> {
        ensure_kind(WorkItemKind::Subtask, external_id)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: SubtaskId::new(),
            external_id,
            task_id: draft.task_id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            created_by: draft.created_by,
            assigned_to: draft.assigned_to,
            progress: Progress::default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a subtask from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSubtaskData) -> Self {
        Self {
            id: data.id,
            external_id: data.external_id,
            task_id: data.task_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            progress: data.progress,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the external identifier.
    #[must_use]
    pub const fn external_id(&self) -> ExternalId {
        self.external_id
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creating manager.
    #[must_use]
    pub const fn created_by(&self) -> ActorId {
        self.created_by
    }

    /// Returns the assigned staff member, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<ActorId> {
        self.assigned_to
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> WorkItemStatus {
        self.progress.status()
    }

    /// Returns the status and completion bookkeeping.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns when the subtask was first completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.progress.completed_at()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the subtask is open and its due date is before
    /// `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status().is_open() && self.due_date.is_some_and(|due| due < today)
    }

    /// Transitions the subtask to a new status.
    pub fn transition_status(&mut self, to: WorkItemStatus, clock: &impl Clock) -> StatusChange {
        let now = clock.utc();
        let change = self.progress.transition(to, now);
        self.updated_at = now;
        change
    }

    /// Assigns, reassigns, or clears the assignee.
    pub fn assign(&mut self, assignee: Option<ActorId>, clock: &impl Clock) {
        self.assigned_to = assignee;
        self.updated_at = clock.utc();
    }
}
