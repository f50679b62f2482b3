//! Identifier allocation against the database counter and max scan.

use std::collections::BTreeSet;
use std::sync::Arc;

use etms::work_item::{
    adapters::{max_scan::MaxScanSequence, postgres::PostgresSequenceCounter},
    domain::{ExternalId, NewTask, SequenceNumber, Task, WorkItemKind},
    ports::{SequenceSource, WorkItemRepository},
    services::{CreateTaskRequest, ExternalIdAllocator, WorkItemService},
};
use mockable::DefaultClock;
use tokio::task::JoinSet;

use super::helpers::prepared_db;

const CONCURRENT_REQUESTS: u64 = 8;

#[tokio::test(flavor = "multi_thread")]
async fn counter_starts_above_imported_identifiers() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let draft = NewTask::new("Imported", db.team.admin.id(), db.team.manager.id())?;
    let imported = Task::create(
        draft,
        ExternalId::new(WorkItemKind::Task, SequenceNumber::new(7)?),
        &DefaultClock,
    )?;
    db.repository.store_task(&imported).await?;
    let counter = PostgresSequenceCounter::new(db.pool.clone());

    let first = counter.next_sequence(WorkItemKind::Task).await?;
    let second = counter.next_sequence(WorkItemKind::Task).await?;
    let subtask = counter.next_sequence(WorkItemKind::Subtask).await?;

    eyre::ensure!(first.value() == 8, "seeded from the stored maximum, got {first}");
    eyre::ensure!(second.value() == 9, "then increments, got {second}");
    eyre::ensure!(subtask.value() == 1, "kinds count separately, got {subtask}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creation_with_the_counter_is_gapless() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let service = db.service();
    let mut requests = JoinSet::new();
    for index in 0..CONCURRENT_REQUESTS {
        let worker = service.clone();
        let admin = db.team.admin.clone();
        let manager = db.team.manager.id();
        requests.spawn(async move {
            worker
                .create_task(&admin, CreateTaskRequest::new(format!("Batch {index}"), manager))
                .await
        });
    }

    let mut identifiers = BTreeSet::new();
    while let Some(joined) = requests.join_next().await {
        identifiers.insert(joined??.external_id().sequence().value());
    }

    let expected: BTreeSet<u64> = (1..=CONCURRENT_REQUESTS).collect();
    eyre::ensure!(identifiers == expected, "got {identifiers:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creation_with_max_scan_stays_unique() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let allocator =
        ExternalIdAllocator::new(Arc::new(MaxScanSequence::new(Arc::clone(&db.repository))));
    let service = WorkItemService::new(
        Arc::clone(&db.repository),
        Arc::clone(&db.actors),
        allocator,
        Arc::new(DefaultClock),
    );
    let mut requests = JoinSet::new();
    for index in 0..CONCURRENT_REQUESTS {
        let worker = service.clone();
        let admin = db.team.admin.clone();
        let manager = db.team.manager.id();
        requests.spawn(async move {
            worker
                .create_task(&admin, CreateTaskRequest::new(format!("Scan {index}"), manager))
                .await
        });
    }

    let mut identifiers = BTreeSet::new();
    while let Some(joined) = requests.join_next().await {
        identifiers.insert(joined??.external_id().to_string());
    }

    eyre::ensure!(
        u64::try_from(identifiers.len())? == CONCURRENT_REQUESTS,
        "every request got its own identifier: {identifiers:?}"
    );
    Ok(())
}
