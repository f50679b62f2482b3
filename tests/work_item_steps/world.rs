//! Shared world state for work-item lifecycle scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use etms::actor::adapters::memory::InMemoryActorRepository;
use etms::work_item::{
    adapters::memory::{InMemorySequenceCounter, InMemoryWorkItemRepository},
    domain::{SequenceNumber, Subtask, Task, WorkItemKind},
    ports::{DeletedTask, SequenceSource, WorkItemRepositoryError, WorkItemRepositoryResult},
    services::{ExternalIdAllocator, WorkItemService, WorkItemServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

use crate::test_helpers::Team;

/// Service type used by the scenario world.
pub type ScenarioService = WorkItemService<
    InMemoryWorkItemRepository,
    InMemoryActorRepository,
    ScriptedSequence,
    DefaultClock,
>;

/// Sequence source that counts calls and can be pinned to one value.
#[derive(Debug, Default)]
pub struct ScriptedSequence {
    counter: InMemorySequenceCounter,
    pinned: AtomicU64,
    calls: AtomicU64,
}

impl ScriptedSequence {
    /// Makes every later call return `value`.
    pub fn pin(&self, value: u64) {
        self.pinned.store(value, Ordering::SeqCst);
    }

    /// Number of candidates handed out so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SequenceSource for ScriptedSequence {
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pinned.load(Ordering::SeqCst) {
            0 => self.counter.next_sequence(kind).await,
            value => SequenceNumber::new(value).map_err(WorkItemRepositoryError::persistence),
        }
    }
}

/// Scenario world for work-item lifecycle behaviour tests.
pub struct WorkItemWorld {
    pub repository: Arc<InMemoryWorkItemRepository>,
    pub actors: Arc<InMemoryActorRepository>,
    pub sequence: Arc<ScriptedSequence>,
    pub service: ScenarioService,
    pub team: Option<Team>,
    pub tasks: Vec<Task>,
    pub subtasks: Vec<Subtask>,
    pub first_completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<WorkItemServiceError>,
    pub deleted: Option<DeletedTask>,
}

impl WorkItemWorld {
    /// Creates a world with empty stores and an unpinned sequence.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryWorkItemRepository::new());
        let actors = Arc::new(InMemoryActorRepository::new());
        let sequence = Arc::new(ScriptedSequence::default());
        let service = WorkItemService::new(
            Arc::clone(&repository),
            Arc::clone(&actors),
            ExternalIdAllocator::new(Arc::clone(&sequence)),
            Arc::new(DefaultClock),
        );
        Self {
            repository,
            actors,
            sequence,
            service,
            team: None,
            tasks: Vec::new(),
            subtasks: Vec::new(),
            first_completed_at: None,
            last_error: None,
            deleted: None,
        }
    }

    /// Returns the seeded organisation.
    pub fn team(&self) -> Result<&Team, eyre::Report> {
        self.team
            .as_ref()
            .ok_or_else(|| eyre::eyre!("organisation has not been seeded"))
    }

    /// Returns the most recently created task.
    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.tasks
            .last()
            .ok_or_else(|| eyre::eyre!("no task has been created in this scenario"))
    }

    /// Returns the most recently created subtask.
    pub fn current_subtask(&self) -> Result<&Subtask, eyre::Report> {
        self.subtasks
            .last()
            .ok_or_else(|| eyre::eyre!("no subtask has been created in this scenario"))
    }
}

impl Default for WorkItemWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkItemWorld {
    WorkItemWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
