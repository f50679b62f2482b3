//! Work-item status and completion bookkeeping.

use super::ParseStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status shared by tasks and subtasks.
///
/// Every transition between statuses is permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    /// Not started.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl WorkItemStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for statuses that still count as outstanding work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkItemStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Record of a status change applied to a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the change.
    pub from: WorkItemStatus,
    /// Status after the change.
    pub to: WorkItemStatus,
    /// `true` when this change stamped the completion time.
    pub first_completion: bool,
}

/// Current status plus the sticky completion timestamp.
///
/// `completed_at` is written the first time the status becomes
/// [`WorkItemStatus::Completed`] and never changes afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    status: WorkItemStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// Reconstructs progress from persisted values.
    #[must_use]
    pub const fn from_parts(status: WorkItemStatus, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status,
            completed_at,
        }
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> WorkItemStatus {
        self.status
    }

    /// Returns when the item was first completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Moves to `to` at time `now`.
    pub fn transition(&mut self, to: WorkItemStatus, now: DateTime<Utc>) -> StatusChange {
        let from = self.status;
        let first_completion = to == WorkItemStatus::Completed && self.completed_at.is_none();
        if first_completion {
            self.completed_at = Some(now);
        }
        self.status = to;
        StatusChange {
            from,
            to,
            first_completion,
        }
    }
}
