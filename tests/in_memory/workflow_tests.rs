//! A task followed from creation to deletion across all three roles.

use chrono::NaiveDate;
use etms::work_item::{
    domain::{ExternalId, Priority, WorkItemKind, WorkItemStatus},
    services::{CreateSubtaskRequest, CreateTaskRequest},
};

use super::helpers::deployment;

#[tokio::test(flavor = "multi_thread")]
async fn task_moves_from_admin_to_staff_and_back() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let due = NaiveDate::from_ymd_opt(2026, 11, 30).ok_or_else(|| eyre::eyre!("bad date"))?;

    let task = env
        .work_items
        .create_task(
            &team.admin,
            CreateTaskRequest::new("Warehouse relabelling", team.manager.id())
                .with_description("New bin labels for aisles A to F")
                .with_priority(Priority::High)
                .with_due_date(due),
        )
        .await?;
    eyre::ensure!(task.external_id().to_string() == "T0001", "first task is T0001");
    eyre::ensure!(task.status() == WorkItemStatus::Pending, "new tasks are pending");

    let subtask = env
        .work_items
        .create_subtask(
            &team.manager,
            CreateSubtaskRequest::new(task.id(), "Print labels").with_assignee(team.staff.id()),
        )
        .await?;
    eyre::ensure!(subtask.external_id().to_string() == "ST0001", "first subtask is ST0001");

    let started = env
        .work_items
        .change_subtask_status(&team.staff, subtask.id(), WorkItemStatus::InProgress)
        .await?;
    eyre::ensure!(started.completed_at().is_none(), "not completed yet");
    let finished = env
        .work_items
        .change_subtask_status(&team.staff, subtask.id(), WorkItemStatus::Completed)
        .await?;
    eyre::ensure!(finished.completed_at().is_some(), "completion is stamped");

    let parent_for_staff = env.work_items.get_task(&team.staff, task.id()).await?;
    eyre::ensure!(parent_for_staff.id() == task.id(), "staff can read the parent task");

    let closed = env
        .work_items
        .change_task_status(&team.manager, task.id(), WorkItemStatus::Completed)
        .await?;
    eyre::ensure!(closed.status() == WorkItemStatus::Completed, "manager closes the task");

    let deleted = env.work_items.delete_task(&team.admin, task.id()).await?;
    eyre::ensure!(deleted.subtask_ids == vec![subtask.id()], "subtask goes with the task");
    let lookup = env
        .work_items
        .find_task_by_external_id(&team.admin, ExternalId::parse(WorkItemKind::Task, "T0001")?)
        .await?;
    eyre::ensure!(lookup.is_none(), "deleted task is gone");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_see_or_change_the_work() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let task = env
        .work_items
        .create_task(&team.admin, CreateTaskRequest::new("Fleet inspection", team.manager.id()))
        .await?;

    let hidden = env.work_items.get_task(&team.other_manager, task.id()).await;
    eyre::ensure!(
        hidden.as_ref().is_err_and(|err| err.is_authorization_mismatch()),
        "another manager must not see the task, got {hidden:?}"
    );
    let refused = env
        .work_items
        .change_task_status(&team.other_staff, task.id(), WorkItemStatus::Cancelled)
        .await;
    eyre::ensure!(
        refused.as_ref().is_err_and(|err| err.is_authorization_mismatch()),
        "unrelated staff must not change the task, got {refused:?}"
    );
    let listed = env.work_items.list_tasks(&team.other_manager, None).await?;
    eyre::ensure!(listed.is_empty(), "nothing is listed for another manager");

    let stored = env.work_items.get_task(&team.admin, task.id()).await?;
    eyre::ensure!(stored.status() == WorkItemStatus::Pending, "status is unchanged");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn identifiers_stay_sequential_after_deletions() -> Result<(), eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let mut created = Vec::new();
    for title in ["First", "Second", "Third"] {
        created.push(
            env.work_items
                .create_task(&team.admin, CreateTaskRequest::new(title, team.manager.id()))
                .await?,
        );
    }
    let second = created
        .get(1)
        .ok_or_else(|| eyre::eyre!("three tasks were created"))?;
    env.work_items.delete_task(&team.admin, second.id()).await?;

    let next = env
        .work_items
        .create_task(&team.admin, CreateTaskRequest::new("Fourth", team.manager.id()))
        .await?;
    eyre::ensure!(
        next.external_id().to_string() == "T0004",
        "identifiers are never reused, got {}",
        next.external_id()
    );
    Ok(())
}
