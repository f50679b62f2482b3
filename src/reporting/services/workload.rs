//! Workload report service.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tracing::debug;

use crate::actor::{
    domain::Actor,
    ports::{ActorRepository, ActorRepositoryError},
};
use crate::reporting::domain::{ReportWindow, ReportWindowError, WorkloadReport};
use crate::work_item::{
    ports::{SequenceSource, WorkItemRepository},
    services::{WorkItemService, WorkItemServiceError},
};

/// Errors raised while producing reports.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// Collecting the visible work failed.
    #[error(transparent)]
    WorkItem(#[from] WorkItemServiceError),
    /// Resolving assignee names failed.
    #[error(transparent)]
    ActorLookup(#[from] ActorRepositoryError),
    /// The requested window is empty or inverted.
    #[error(transparent)]
    Window(#[from] ReportWindowError),
    /// Template rendering failed.
    #[error("failed to render report: {0}")]
    Render(String),
}

/// Result type for reporting operations.
pub type ReportingResult<T> = Result<T, ReportingError>;

/// Computes workload reports scoped to the requesting actor.
#[derive(Clone)]
pub struct ReportService<R, A, S, C>
where
    R: WorkItemRepository,
    A: ActorRepository,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    work_items: WorkItemService<R, A, S, C>,
    actors: Arc<A>,
    clock: Arc<C>,
}

impl<R, A, S, C> ReportService<R, A, S, C>
where
    R: WorkItemRepository,
    A: ActorRepository,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    /// Creates a report service.
    #[must_use]
    pub const fn new(
        work_items: WorkItemService<R, A, S, C>,
        actors: Arc<A>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            work_items,
            actors,
            clock,
        }
    }

    /// Summarises the work `viewer` may see. When `window` is given the
    /// report also counts items first completed inside it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::WorkItem`] or
    /// [`ReportingError::ActorLookup`] when a lookup fails.
    pub async fn workload_report(
        &self,
        viewer: &Actor,
        window: Option<ReportWindow>,
    ) -> ReportingResult<WorkloadReport> {
        let work = self.work_items.visible_work(viewer).await?;
        let mut report = WorkloadReport::build(
            viewer.id(),
            &work.tasks,
            &work.subtasks,
            self.clock.utc(),
            window,
        );
        for row in &mut report.assignees {
            row.display_name = self
                .actors
                .find_by_id(row.assignee)
                .await?
                .map(|actor| actor.display_name().to_owned());
        }
        debug!(
            viewer = %viewer.id(),
            tasks = report.tasks.total,
            subtasks = report.subtasks.total,
            overdue = report.overdue.len(),
            "computed workload report"
        );
        Ok(report)
    }
}
