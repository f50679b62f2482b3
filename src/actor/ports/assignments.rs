//! Port for asking which work items still depend on an actor.

use crate::actor::domain::ActorId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment lookups.
pub type AssignmentLookupResult<T> = Result<T, AssignmentLookupError>;

/// Read access to the work assigned to an actor.
///
/// The directory consults this before changing an actor's role, since task
/// assignees must be managers and subtask assignees must be staff.
#[async_trait]
pub trait AssignmentLookup: Send + Sync {
    /// Counts the tasks and subtasks currently assigned to `actor_id`.
    async fn assigned_work_count(&self, actor_id: ActorId) -> AssignmentLookupResult<usize>;
}

/// The assignment lookup could not be completed.
#[derive(Debug, Clone, Error)]
#[error("assignment lookup failed: {0}")]
pub struct AssignmentLookupError(Arc<dyn std::error::Error + Send + Sync>);

impl AssignmentLookupError {
    /// Wraps the underlying failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
