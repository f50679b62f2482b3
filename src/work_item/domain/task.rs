//! Task aggregate root.

use super::{
    ExternalId, ParsePriorityError, Progress, StatusChange, TaskId, WorkItemDomainError,
    WorkItemKind, WorkItemStatus,
};
use crate::actor::domain::ActorId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length in characters.
pub(super) const MAX_TITLE_CHARS: usize = 200;

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Validated task fields awaiting an external identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    priority: Priority,
    due_date: Option<NaiveDate>,
    created_by: ActorId,
    assigned_to: ActorId,
}

impl NewTask {
    /// Creates a task draft.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::EmptyTitle`] or
    /// [`WorkItemDomainError::TitleTooLong`] for an unusable title.
    pub fn new(
        title: impl Into<String>,
        created_by: ActorId,
        assigned_to: ActorId,
    ) -> Result<Self, WorkItemDomainError> {
        Ok(Self {
            title: normalize_title(title.into())?,
            description: None,
            priority: Priority::default(),
            due_date: None,
            created_by,
            assigned_to,
        })
    }

    /// Sets the description; blank text clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(description.into());
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

    /// Returns the assignee.
    #[must_use]
    pub const fn assigned_to(&self) -> ActorId {
        self.assigned_to
    }
}

/// Partial update of a task's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsUpdate {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description; `Some("")` clears it.
    pub description: Option<String>,
    /// Replacement priority.
    pub priority: Option<Priority>,
    /// Replacement due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    external_id: ExternalId,
    title: String,
    description: Option<String>,
    priority: Priority,
    due_date: Option<NaiveDate>,
    created_by: ActorId,
    assigned_to: ActorId,
    progress: Progress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted external identifier.
    pub external_id: ExternalId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted creator.
    pub created_by: ActorId,
    /// Persisted assignee.
    pub assigned_to: ActorId,
    /// Persisted status and completion time.
    pub progress: Progress,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task from a draft and its allocated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::KindMismatch`] when `external_id` is not
    /// a task identifier.
    pub fn create(
        draft: NewTask,
        external_id: ExternalId,
        clock: &impl Clock,
    ) -> Result<Self, WorkItemDomainError> {
        ensure_kind(WorkItemKind::Task, external_id)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            external_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            created_by: draft.created_by,
            assigned_to: draft.assigned_to,
            progress: Progress::default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            external_id: data.external_id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            due_date: data.due_date,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            progress: data.progress,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the external identifier.
    #[must_use]
    pub const fn external_id(&self) -> ExternalId {
        self.external_id
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

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> ActorId {
        self.created_by
    }

    /// Returns the assigned manager.
    #[must_use]
    pub const fn assigned_to(&self) -> ActorId {
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

    /// Returns when the task was first completed.
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

    /// Returns `true` when the task is open and its due date is before
    /// `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status().is_open() && self.due_date.is_some_and(|due| due < today)
    }

    /// Transitions the task to a new status.
    pub fn transition_status(&mut self, to: WorkItemStatus, clock: &impl Clock) -> StatusChange {
        let now = clock.utc();
        let change = self.progress.transition(to, now);
        self.updated_at = now;
        change
    }

    /// Reassigns the task to another manager.
    pub fn reassign(&mut self, assignee: ActorId, clock: &impl Clock) {
        self.assigned_to = assignee;
        self.updated_at = clock.utc();
    }

    /// Applies a partial update of descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns a title validation error; the task is unchanged on error.
    pub fn update_details(
        &mut self,
        update: TaskDetailsUpdate,
        clock: &impl Clock,
    ) -> Result<(), WorkItemDomainError> {
        let title = update.title.map(normalize_title).transpose()?;
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(description) = update.description {
            self.description = normalize_description(description);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

pub(super) fn normalize_title(raw: String) -> Result<String, WorkItemDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkItemDomainError::EmptyTitle);
    }
    let actual = trimmed.chars().count();
    if actual > MAX_TITLE_CHARS {
        return Err(WorkItemDomainError::TitleTooLong {
            max: MAX_TITLE_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_owned())
}

pub(super) fn normalize_description(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

pub(super) fn ensure_kind(
    expected: WorkItemKind,
    external_id: ExternalId,
) -> Result<(), WorkItemDomainError> {
    let actual = external_id.kind();
    if actual != expected {
        return Err(WorkItemDomainError::KindMismatch { expected, actual });
    }
    Ok(())
}
