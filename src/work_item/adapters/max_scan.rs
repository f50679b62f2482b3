//! Sequence source that scans for the highest stored identifier.

use async_trait::async_trait;
use std::sync::Arc;

use crate::work_item::{
    domain::{ExternalId, SequenceNumber, WorkItemKind},
    ports::{SequenceSource, WorkItemRepository, WorkItemRepositoryResult},
};

/// [`SequenceSource`] proposing one past the highest stored identifier.
///
/// Two concurrent callers can read the same maximum, so candidates from this
/// source collide under load and rely on the allocator's retry loop. A
/// stored identifier that does not parse counts as no identifier at all.
#[derive(Debug)]
pub struct MaxScanSequence<R> {
    repository: Arc<R>,
}

impl<R> MaxScanSequence<R> {
    /// Creates a source reading from `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> Clone for MaxScanSequence<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[async_trait]
impl<R> SequenceSource for MaxScanSequence<R>
where
    R: WorkItemRepository,
{
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber> {
        let latest = self.repository.latest_external_id(kind).await?;
        Ok(ExternalId::next_after(kind, latest.as_deref()).sequence())
    }
}
