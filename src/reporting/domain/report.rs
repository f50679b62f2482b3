//! Workload report aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::ReportWindow;
use crate::actor::domain::ActorId;
use crate::work_item::domain::{ExternalId, Subtask, Task, WorkItemStatus};

/// Number of work items in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Pending items.
    pub pending: usize,
    /// Items in progress.
    pub in_progress: usize,
    /// Completed items.
    pub completed: usize,
    /// Cancelled items.
    pub cancelled: usize,
    /// All items.
    pub total: usize,
}

impl StatusCounts {
    /// Counts one item in `status`.
    pub const fn record(&mut self, status: WorkItemStatus) {
        match status {
            WorkItemStatus::Pending => self.pending += 1,
            WorkItemStatus::InProgress => self.in_progress += 1,
            WorkItemStatus::Completed => self.completed += 1,
            WorkItemStatus::Cancelled => self.cancelled += 1,
        }
        self.total += 1;
    }

    /// Items still pending or in progress.
    #[must_use]
    pub const fn open(&self) -> usize {
        self.pending + self.in_progress
    }
}

/// Work held by one assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeWorkload {
    /// Assignee.
    pub assignee: ActorId,
    /// Display name, when the assignee could be resolved.
    pub display_name: Option<String>,
    /// Pending or in-progress items.
    pub open: usize,
    /// Completed items.
    pub completed: usize,
    /// Open items past their due date.
    pub overdue: usize,
}

/// An open work item past its due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueItem {
    /// External identifier.
    pub external_id: ExternalId,
    /// Title.
    pub title: String,
    /// Due date that has passed.
    pub due_date: NaiveDate,
    /// Assignee, if any.
    pub assigned_to: Option<ActorId>,
}

/// Summary of the work visible to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadReport {
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
    /// Actor the report was computed for.
    pub generated_for: ActorId,
    /// Completion window, if requested.
    pub window: Option<ReportWindow>,
    /// Task status counts.
    pub tasks: StatusCounts,
    /// Subtask status counts.
    pub subtasks: StatusCounts,
    /// Completed items as a whole percentage of non-cancelled items.
    pub completion_rate_percent: u8,
    /// Items first completed inside the window.
    pub completed_in_window: Option<usize>,
    /// Per-assignee workload, ordered by assignee.
    pub assignees: Vec<AssigneeWorkload>,
    /// Subtasks nobody holds yet.
    pub unassigned_subtasks: usize,
    /// Overdue items, earliest due date first.
    pub overdue: Vec<OverdueItem>,
}

#[derive(Default)]
struct Tally {
    open: usize,
    completed: usize,
    overdue: usize,
}

impl Tally {
    const fn record(&mut self, status: WorkItemStatus, overdue: bool) {
        if status.is_open() {
            self.open += 1;
        } else if matches!(status, WorkItemStatus::Completed) {
            self.completed += 1;
        }
        if overdue {
            self.overdue += 1;
        }
    }
}

impl WorkloadReport {
    /// Aggregates `tasks` and `subtasks` as seen by `viewer` at `now`.
    ///
    /// Assignee display names are left empty; callers fill them in.
    #[must_use]
    pub fn build(
        viewer: ActorId,
        tasks: &[Task],
        subtasks: &[Subtask],
        now: DateTime<Utc>,
        window: Option<ReportWindow>,
    ) -> Self {
        let today = now.date_naive();
        let mut task_counts = StatusCounts::default();
        let mut subtask_counts = StatusCounts::default();
        let mut tallies: BTreeMap<ActorId, Tally> = BTreeMap::new();
        let mut overdue = Vec::new();
        let mut completed_in_window = 0;
        let mut unassigned_subtasks = 0;

        let in_window = |completed_at: Option<DateTime<Utc>>| {
            window
                .zip(completed_at)
                .is_some_and(|(range, at)| range.contains(at))
        };

        for task in tasks {
            task_counts.record(task.status());
            let is_overdue = task.is_overdue(today);
            tallies
                .entry(task.assigned_to())
                .or_default()
                .record(task.status(), is_overdue);
            if let (true, Some(due_date)) = (is_overdue, task.due_date()) {
                overdue.push(OverdueItem {
                    external_id: task.external_id(),
                    title: task.title().to_owned(),
                    due_date,
                    assigned_to: Some(task.assigned_to()),
                });
            }
            if in_window(task.completed_at()) {
                completed_in_window += 1;
            }
        }

        for subtask in subtasks {
            subtask_counts.record(subtask.status());
            let is_overdue = subtask.is_overdue(today);
            match subtask.assigned_to() {
                Some(assignee) => tallies
                    .entry(assignee)
                    .or_default()
                    .record(subtask.status(), is_overdue),
                None => unassigned_subtasks += 1,
            }
            if let (true, Some(due_date)) = (is_overdue, subtask.due_date()) {
                overdue.push(OverdueItem {
                    external_id: subtask.external_id(),
                    title: subtask.title().to_owned(),
                    due_date,
                    assigned_to: subtask.assigned_to(),
                });
            }
            if in_window(subtask.completed_at()) {
                completed_in_window += 1;
            }
        }

        overdue.sort_by(|left, right| {
            left.due_date
                .cmp(&right.due_date)
                .then_with(|| left.external_id.cmp(&right.external_id))
        });

        Self {
            generated_at: now,
            generated_for: viewer,
            window,
            tasks: task_counts,
            subtasks: subtask_counts,
            completion_rate_percent: completion_rate(&task_counts, &subtask_counts),
            completed_in_window: window.map(|_| completed_in_window),
            assignees: tallies
                .into_iter()
                .map(|(assignee, tally)| AssigneeWorkload {
                    assignee,
                    display_name: None,
                    open: tally.open,
                    completed: tally.completed,
                    overdue: tally.overdue,
                })
                .collect(),
            unassigned_subtasks,
            overdue,
        }
    }
}

/// Completed share of all non-cancelled items, rounded down; zero when there
/// is nothing to complete.
fn completion_rate(tasks: &StatusCounts, subtasks: &StatusCounts) -> u8 {
    let completed = tasks.completed + subtasks.completed;
    let countable = (tasks.total - tasks.cancelled) + (subtasks.total - subtasks.cancelled);
    completed
        .saturating_mul(100)
        .checked_div(countable)
        .map_or(0, |percent| u8::try_from(percent).unwrap_or(u8::MAX))
}
