//! Workload reports over a board populated through the public services.

use chrono::{Duration, Utc};
use etms::reporting::{domain::ReportWindow, services::render_text};
use etms::work_item::{
    domain::WorkItemStatus,
    services::{CreateSubtaskRequest, CreateTaskRequest},
};

use super::helpers::{Deployment, deployment};

async fn board() -> Result<Deployment, eyre::Report> {
    let env = deployment().await?;
    let team = &env.team;
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let task = env
        .work_items
        .create_task(
            &team.admin,
            CreateTaskRequest::new("Safety inspection", team.manager.id()).with_due_date(yesterday),
        )
        .await?;
    for (title, status) in [
        ("Check extinguishers", WorkItemStatus::Completed),
        ("Check exits", WorkItemStatus::InProgress),
    ] {
        let subtask = env
            .work_items
            .create_subtask(
                &team.manager,
                CreateSubtaskRequest::new(task.id(), title).with_assignee(team.staff.id()),
            )
            .await?;
        env.work_items
            .change_subtask_status(&team.staff, subtask.id(), status)
            .await?;
    }
    env.work_items
        .create_task(&team.admin, CreateTaskRequest::new("Payroll run", team.other_manager.id()))
        .await?;
    Ok(env)
}

#[tokio::test(flavor = "multi_thread")]
async fn staff_report_shows_their_subtasks_and_parent() -> Result<(), eyre::Report> {
    let env = board().await?;

    let report = env.reports.workload_report(&env.team.staff, None).await?;

    eyre::ensure!(report.tasks.total == 1, "only the parent task is visible");
    eyre::ensure!(report.subtasks.total == 2, "both subtasks are visible");
    eyre::ensure!(report.completion_rate_percent == 33, "one of three items is done");
    eyre::ensure!(
        report.overdue.iter().any(|item| item.title == "Safety inspection"),
        "the overdue parent is listed"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_report_renders_every_task() -> Result<(), eyre::Report> {
    let env = board().await?;
    let now = Utc::now();
    let window = ReportWindow::new(now - Duration::hours(1), now + Duration::hours(1))?;

    let report = env
        .reports
        .workload_report(&env.team.admin, Some(window))
        .await?;
    let text = render_text(&report)?;

    eyre::ensure!(report.tasks.total == 2, "administrators see every task");
    eyre::ensure!(report.completed_in_window == Some(1), "one completion in the window");
    eyre::ensure!(text.contains("Tasks: 2"), "task totals are rendered:\n{text}");
    eyre::ensure!(
        text.contains("Sam Staff: open 1, completed 1"),
        "assignee rows are rendered:\n{text}"
    );
    Ok(())
}
