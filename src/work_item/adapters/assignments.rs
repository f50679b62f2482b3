//! Assignment lookups answered from the work-item repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::actor::{
    domain::ActorId,
    ports::{AssignmentLookup, AssignmentLookupError, AssignmentLookupResult},
};
use crate::work_item::ports::{SubtaskFilter, TaskFilter, WorkItemRepository};

/// Counts work assigned to an actor using any [`WorkItemRepository`].
#[derive(Debug, Clone)]
pub struct WorkItemAssignments<R> {
    repository: Arc<R>,
}

impl<R> WorkItemAssignments<R> {
    /// Wraps a work-item repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> AssignmentLookup for WorkItemAssignments<R>
where
    R: WorkItemRepository,
{
    async fn assigned_work_count(&self, actor_id: ActorId) -> AssignmentLookupResult<usize> {
        let tasks = self
            .repository
            .list_tasks(TaskFilter::default().with_assignee(actor_id))
            .await
            .map_err(AssignmentLookupError::new)?;
        let subtasks = self
            .repository
            .list_subtasks(SubtaskFilter::default().with_assignee(actor_id))
            .await
            .map_err(AssignmentLookupError::new)?;
        Ok(tasks.len().saturating_add(subtasks.len()))
    }
}
