//! External identifier allocation with a bounded retry loop.
//!
//! Allocation is optimistic: take a candidate sequence, try to persist the
//! record under it, and start over when the store reports that the
//! identifier is already taken. The store's uniqueness constraint decides;
//! the sequence source only proposes.

use crate::config::{AllocationConfig, AllocationStrategy, DEFAULT_MAX_ALLOCATION_ATTEMPTS};
use crate::work_item::{
    domain::{ExternalId, SequenceNumber, WorkItemKind},
    ports::{SequenceSource, WorkItemRepositoryError, WorkItemRepositoryResult},
};
use async_trait::async_trait;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Every allocation attempt for a kind hit an identifier that was already
/// taken. Nothing was persisted; the request may be retried.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("could not allocate a unique {kind} identifier after {attempts} attempts")]
pub struct AllocationExhausted {
    /// Kind being allocated.
    pub kind: WorkItemKind,
    /// Attempts made.
    pub attempts: u32,
}

/// Error types a claim closure can fail with.
pub trait ClaimError: From<WorkItemRepositoryError> + From<AllocationExhausted> {
    /// Returns the identifier this error reports as already taken, if any.
    fn taken_external_id(&self) -> Option<ExternalId>;
}

impl ClaimError for AllocationFailure {
    fn taken_external_id(&self) -> Option<ExternalId> {
        match self {
            Self::Repository(WorkItemRepositoryError::DuplicateExternalId(taken)) => Some(*taken),
            _ => None,
        }
    }
}

/// Failure of an allocation whose claim only touches the repository.
#[derive(Debug, Error)]
pub enum AllocationFailure {
    /// Attempts exhausted.
    #[error(transparent)]
    Exhausted(#[from] AllocationExhausted),
    /// Sequence source or store failure other than an identifier conflict.
    #[error(transparent)]
    Repository(#[from] WorkItemRepositoryError),
}

/// Allocates external identifiers and runs the claim that persists them.
#[derive(Debug)]
pub struct ExternalIdAllocator<S> {
    source: Arc<S>,
    max_attempts: NonZeroU32,
}

impl<S> Clone for ExternalIdAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            max_attempts: self.max_attempts,
        }
    }
}

impl<S> ExternalIdAllocator<S>
where
    S: SequenceSource,
{
    /// Creates an allocator making up to ten attempts per request.
    #[must_use]
    pub const fn new(source: Arc<S>) -> Self {
        Self {
            source,
            max_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
        }
    }

    /// Overrides the attempt bound.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: NonZeroU32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns the attempt bound.
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Allocates an identifier of `kind` and hands it to `claim`, retrying
    /// with a fresh candidate whenever the claim reports the identifier as
    /// taken.
    ///
    /// Any other claim error aborts immediately.
    ///
    /// # Errors
    ///
    /// Returns the claim's error, a sequence source error converted into
    /// `E`, or [`AllocationExhausted`] converted into `E` once every attempt
    /// conflicted.
    pub async fn allocate_with<T, E, F, Fut>(
        &self,
        kind: WorkItemKind,
        mut claim: F,
    ) -> Result<T, E>
    where
        E: ClaimError,
        F: FnMut(ExternalId) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let limit = self.max_attempts.get();
        for attempt in 1..=limit {
            let sequence = self.source.next_sequence(kind).await?;
            let candidate = ExternalId::new(kind, sequence);
            match claim(candidate).await {
                Ok(value) => {
                    debug!(
                        %kind,
                        external_id = %candidate,
                        attempt,
                        "allocated external identifier"
                    );
                    return Ok(value);
                }
                Err(err) => match err.taken_external_id() {
                    Some(taken) => warn!(
                        %kind,
                        external_id = %taken,
                        attempt,
                        max_attempts = limit,
                        "external identifier already taken, retrying"
                    ),
                    None => return Err(err),
                },
            }
        }
        error!(%kind, attempts = limit, "external identifier allocation exhausted");
        Err(AllocationExhausted {
            kind,
            attempts: limit,
        }
        .into())
    }
}

/// Sequence source selected at runtime from [`AllocationConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredSequence<C, M> {
    /// Atomic counter.
    Counter(C),
    /// Highest stored identifier plus one.
    MaxScan(M),
}

impl<C, M> ConfiguredSequence<C, M> {
    /// Picks the source named by `config`.
    #[must_use]
    pub fn select(config: &AllocationConfig, counter: C, max_scan: M) -> Self {
        match config.strategy {
            AllocationStrategy::Counter => Self::Counter(counter),
            AllocationStrategy::MaxScan => Self::MaxScan(max_scan),
        }
    }
}

#[async_trait]
impl<C, M> SequenceSource for ConfiguredSequence<C, M>
where
    C: SequenceSource,
    M: SequenceSource,
{
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber> {
        match self {
            Self::Counter(source) => source.next_sequence(kind).await,
            Self::MaxScan(source) => source.next_sequence(kind).await,
        }
    }
}

impl<C, M> ExternalIdAllocator<ConfiguredSequence<C, M>>
where
    C: SequenceSource,
    M: SequenceSource,
{
    /// Builds an allocator honouring both the strategy and the attempt bound
    /// in `config`.
    #[must_use]
    pub fn from_config(config: &AllocationConfig, counter: C, max_scan: M) -> Self {
        Self::new(Arc::new(ConfiguredSequence::select(config, counter, max_scan)))
            .with_max_attempts(config.max_attempts)
    }
}
