//! Diesel repository behaviour against a real database.

use chrono::NaiveDate;
use etms::work_item::{
    domain::{
        Comment, CommentBody, ExternalId, NewTask, Priority, SequenceNumber, Task, WorkItemKind,
        WorkItemStatus,
    },
    ports::{CollaborationRepository, TaskFilter, WorkItemRepository, WorkItemRepositoryError},
    services::{CreateSubtaskRequest, CreateTaskRequest},
};
use mockable::DefaultClock;

use super::helpers::{PreparedDb, prepared_db};

fn imported_task(db: &PreparedDb, sequence: u64) -> Result<Task, eyre::Report> {
    let team = &db.team;
    let draft = NewTask::new(format!("Imported {sequence}"), team.admin.id(), team.manager.id())?
        .with_priority(Priority::Low);
    let external_id = ExternalId::new(WorkItemKind::Task, SequenceNumber::new(sequence)?);
    Ok(Task::create(draft, external_id, &DefaultClock)?)
}

#[tokio::test(flavor = "multi_thread")]
async fn task_fields_survive_a_round_trip() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let due = NaiveDate::from_ymd_opt(2026, 12, 1).ok_or_else(|| eyre::eyre!("bad date"))?;
    let created = db
        .service()
        .create_task(
            &db.team.admin,
            CreateTaskRequest::new("Renew certificates", db.team.manager.id())
                .with_description("Both load balancers")
                .with_priority(Priority::High)
                .with_due_date(due),
        )
        .await?;

    let stored = db
        .repository
        .find_task_by_external_id(created.external_id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should be stored"))?;

    eyre::ensure!(stored.id() == created.id(), "same record");
    eyre::ensure!(stored.title() == "Renew certificates", "title kept");
    eyre::ensure!(stored.description() == Some("Both load balancers"), "description kept");
    eyre::ensure!(stored.priority() == Priority::High, "priority kept");
    eyre::ensure!(stored.due_date() == Some(due), "due date kept");
    eyre::ensure!(stored.assigned_to() == db.team.manager.id(), "assignee kept");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn taken_external_id_is_reported_as_a_conflict() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    db.repository.store_task(&imported_task(&db, 5)?).await?;

    let result = db.repository.store_task(&imported_task(&db, 5)?).await;

    eyre::ensure!(
        matches!(
            result,
            Err(WorkItemRepositoryError::DuplicateExternalId(taken))
                if taken.to_string() == "T0005"
        ),
        "expected a duplicate external id, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn latest_external_id_orders_numerically() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    for sequence in [9, 10, 2] {
        db.repository.store_task(&imported_task(&db, sequence)?).await?;
    }

    let latest = db.repository.latest_external_id(WorkItemKind::Task).await?;
    let subtask_latest = db.repository.latest_external_id(WorkItemKind::Subtask).await?;

    eyre::ensure!(latest.as_deref() == Some("T0010"), "got {latest:?}");
    eyre::ensure!(subtask_latest.is_none(), "no subtasks yet");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_time_is_kept_in_storage() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let service = db.service();
    let manager = &db.team.manager;
    let task = service
        .create_task(&db.team.admin, CreateTaskRequest::new("Close books", manager.id()))
        .await?;

    service
        .change_task_status(manager, task.id(), WorkItemStatus::Completed)
        .await?;
    let first = db
        .repository
        .find_task(task.id())
        .await?
        .and_then(|stored| stored.completed_at())
        .ok_or_else(|| eyre::eyre!("completion should be stored"))?;
    service
        .change_task_status(manager, task.id(), WorkItemStatus::InProgress)
        .await?;

    let reopened = db
        .repository
        .find_task(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should be stored"))?;
    eyre::ensure!(reopened.status() == WorkItemStatus::InProgress, "task is reopened");
    eyre::ensure!(reopened.completed_at() == Some(first), "completion time is kept");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cascades_to_dependents() -> Result<(), eyre::Report> {
    let Some(db) = prepared_db().await? else {
        return Ok(());
    };
    let service = db.service();
    let team = &db.team;
    let task = service
        .create_task(&team.admin, CreateTaskRequest::new("Migrate mail", team.manager.id()))
        .await?;
    let subtask = service
        .create_subtask(
            &team.manager,
            CreateSubtaskRequest::new(task.id(), "Export mailboxes").with_assignee(team.staff.id()),
        )
        .await?;
    let comment = Comment::new(
        subtask.id().into(),
        team.staff.id(),
        CommentBody::new("Halfway there")?,
        &DefaultClock,
    );
    db.repository.store_comment(&comment).await?;

    let deleted = service.delete_task(&team.admin, task.id()).await?;

    eyre::ensure!(deleted.subtask_ids == vec![subtask.id()], "subtask removed");
    eyre::ensure!(db.repository.find_subtask(subtask.id()).await?.is_none(), "subtask gone");
    eyre::ensure!(
        db.repository.list_comments(subtask.id().into()).await?.is_empty(),
        "comments gone"
    );
    eyre::ensure!(
        db.repository.list_tasks(TaskFilter::default()).await?.is_empty(),
        "task gone"
    );
    Ok(())
}
