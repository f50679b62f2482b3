//! Atomic per-kind counter held in process memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::work_item::{
    domain::{SequenceNumber, WorkItemKind},
    ports::{SequenceSource, WorkItemRepositoryError, WorkItemRepositoryResult},
};

/// Counter-backed [`SequenceSource`]; every call hands out a fresh value.
#[derive(Debug, Clone, Default)]
pub struct InMemorySequenceCounter {
    counters: Arc<Mutex<HashMap<WorkItemKind, u64>>>,
}

impl InMemorySequenceCounter {
    /// Creates a counter starting at 1 for every kind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counter whose next value for `kind` follows `last`.
    #[must_use]
    pub fn starting_after(kind: WorkItemKind, last: u64) -> Self {
        let counters = HashMap::from([(kind, last)]);
        Self {
            counters: Arc::new(Mutex::new(counters)),
        }
    }
}

#[async_trait]
impl SequenceSource for InMemorySequenceCounter {
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber> {
        let mut counters = self.counters.lock().map_err(|err| {
            WorkItemRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let value = counters.entry(kind).or_insert(0);
        *value = value.saturating_add(1);
        SequenceNumber::new(*value).map_err(WorkItemRepositoryError::persistence)
    }
}
