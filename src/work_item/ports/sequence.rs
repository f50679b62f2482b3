//! Port for candidate sequence numbers.

use super::WorkItemRepositoryResult;
use crate::work_item::domain::{SequenceNumber, WorkItemKind};
use async_trait::async_trait;

/// Supplies candidate sequence numbers for new work items.
///
/// A candidate is only a proposal: the store's uniqueness constraint on the
/// external identifier remains the final arbiter, and callers retry with a
/// fresh candidate when it is rejected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Returns the next candidate sequence for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkItemRepositoryError::Persistence`] when the
    /// backing store cannot be read.
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber>;
}
