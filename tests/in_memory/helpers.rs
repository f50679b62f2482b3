//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use etms::actor::adapters::memory::InMemoryActorRepository;
use etms::reporting::services::ReportService;
use etms::work_item::{
    adapters::{
        filesystem::CapStdAttachmentStore,
        memory::{InMemorySequenceCounter, InMemoryWorkItemRepository},
    },
    services::{CollaborationService, ExternalIdAllocator, WorkItemService},
};
use mockable::DefaultClock;
use tempfile::TempDir;

use crate::test_helpers::{Team, seed_team};

pub type Service = WorkItemService<
    InMemoryWorkItemRepository,
    InMemoryActorRepository,
    InMemorySequenceCounter,
    DefaultClock,
>;

pub type Collaboration = CollaborationService<
    InMemoryWorkItemRepository,
    InMemoryActorRepository,
    InMemorySequenceCounter,
    CapStdAttachmentStore,
    DefaultClock,
>;

pub type Reports = ReportService<
    InMemoryWorkItemRepository,
    InMemoryActorRepository,
    InMemorySequenceCounter,
    DefaultClock,
>;

/// Fully wired services over in-memory stores and a temporary blob directory.
pub struct Deployment {
    pub team: Team,
    pub repository: Arc<InMemoryWorkItemRepository>,
    pub work_items: Service,
    pub collaboration: Collaboration,
    pub reports: Reports,
    pub blob_dir: TempDir,
}

/// Builds a deployment with a seeded organisation.
///
/// # Errors
///
/// Returns an error when the blob directory cannot be created or the team
/// cannot be stored.
pub async fn deployment() -> Result<Deployment, eyre::Report> {
    let repository = Arc::new(InMemoryWorkItemRepository::new());
    let actors = Arc::new(InMemoryActorRepository::new());
    let clock = Arc::new(DefaultClock);
    let team = seed_team(actors.as_ref()).await?;

    let work_items = WorkItemService::new(
        Arc::clone(&repository),
        Arc::clone(&actors),
        ExternalIdAllocator::new(Arc::new(InMemorySequenceCounter::new())),
        Arc::clone(&clock),
    );
    let blob_dir = tempfile::tempdir()?;
    let store = Arc::new(CapStdAttachmentStore::open(blob_dir.path())?);
    let collaboration = CollaborationService::new(
        work_items.clone(),
        Arc::clone(&repository),
        store,
        Arc::clone(&clock),
    );
    let reports = ReportService::new(work_items.clone(), actors, clock);

    Ok(Deployment {
        team,
        repository,
        work_items,
        collaboration,
        reports,
        blob_dir,
    })
}
