//! Then steps for work-item lifecycle scenarios.

use super::world::{WorkItemWorld, run_async};
use etms::work_item::{
    domain::WorkItemStatus,
    ports::{SubtaskFilter, TaskFilter, WorkItemRepository},
    services::WorkItemServiceError,
};
use rstest_bdd_macros::then;

fn expected_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|part| part.trim().to_owned()).collect()
}

#[then(r#"the task identifiers are "{identifiers}""#)]
fn task_identifiers_are(world: &WorkItemWorld, identifiers: String) -> Result<(), eyre::Report> {
    let actual: Vec<String> = world
        .tasks
        .iter()
        .map(|task| task.external_id().to_string())
        .collect();
    let expected = expected_list(&identifiers);
    if actual != expected {
        return Err(eyre::eyre!("expected task identifiers {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the subtask identifiers are "{identifiers}""#)]
fn subtask_identifiers_are(
    world: &WorkItemWorld,
    identifiers: String,
) -> Result<(), eyre::Report> {
    let actual: Vec<String> = world
        .subtasks
        .iter()
        .map(|subtask| subtask.external_id().to_string())
        .collect();
    let expected = expected_list(&identifiers);
    if actual != expected {
        return Err(eyre::eyre!("expected subtask identifiers {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("creation fails after {attempts:u64} allocation attempts")]
fn creation_fails_after(world: &WorkItemWorld, attempts: u64) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(WorkItemServiceError::IdAllocationExhausted(exhausted))
            if u64::from(exhausted.attempts) == attempts =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!(
            "expected exhaustion after {attempts} attempts, got {other:?}"
        )),
    }
}

#[then("the sequence source was asked {count:u64} times")]
fn sequence_was_asked(world: &WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    let calls = world.sequence.calls();
    if calls != count {
        return Err(eyre::eyre!("expected {count} sequence calls, found {calls}"));
    }
    Ok(())
}

#[then("{count:u64} task is stored")]
fn tasks_stored(world: &WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    let stored = run_async(world.repository.list_tasks(TaskFilter::default()))?;
    if u64::try_from(stored.len())? != count {
        return Err(eyre::eyre!("expected {count} stored tasks, found {}", stored.len()));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &WorkItemWorld, status: String) -> Result<(), eyre::Report> {
    let expected = WorkItemStatus::try_from(status.as_str())?;
    let task_id = world.current_task()?.id();
    let stored = run_async(world.repository.find_task(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} is no longer stored"))?;
    if stored.status() != expected {
        return Err(eyre::eyre!("expected status {expected}, found {}", stored.status()));
    }
    Ok(())
}

#[then(r#"the subtask status is "{status}""#)]
fn subtask_status_is(world: &WorkItemWorld, status: String) -> Result<(), eyre::Report> {
    let expected = WorkItemStatus::try_from(status.as_str())?;
    let subtask_id = world.current_subtask()?.id();
    let stored = run_async(world.repository.find_subtask(subtask_id))?
        .ok_or_else(|| eyre::eyre!("subtask {subtask_id} is no longer stored"))?;
    if stored.status() != expected {
        return Err(eyre::eyre!("expected status {expected}, found {}", stored.status()));
    }
    Ok(())
}

#[then("the task keeps its first completion time")]
fn keeps_first_completion_time(world: &WorkItemWorld) -> Result<(), eyre::Report> {
    let first = world
        .first_completed_at
        .ok_or_else(|| eyre::eyre!("the task was never completed"))?;
    let current = world.current_task()?.completed_at();
    if current != Some(first) {
        return Err(eyre::eyre!("completion time moved from {first} to {current:?}"));
    }
    Ok(())
}

#[then("the change is refused as unauthorised")]
fn change_is_refused(world: &WorkItemWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(err) if err.is_authorization_mismatch() => Ok(()),
        other => Err(eyre::eyre!("expected an authorisation refusal, got {other:?}")),
    }
}

#[then("{count:u64} subtasks were removed with the task")]
fn subtasks_removed(world: &WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    let deleted = world
        .deleted
        .as_ref()
        .ok_or_else(|| eyre::eyre!("the task was not deleted"))?;
    if u64::try_from(deleted.subtask_ids.len())? != count {
        return Err(eyre::eyre!(
            "expected {count} removed subtasks, found {:?}",
            deleted.subtask_ids
        ));
    }
    Ok(())
}

#[then("no subtasks remain")]
fn no_subtasks_remain(world: &WorkItemWorld) -> Result<(), eyre::Report> {
    let remaining = run_async(world.repository.list_subtasks(SubtaskFilter::default()))?;
    if !remaining.is_empty() {
        return Err(eyre::eyre!("expected no subtasks, found {}", remaining.len()));
    }
    Ok(())
}
