//! When steps for work-item lifecycle scenarios.

use super::given::add_subtasks_for_staff;
use super::world::{WorkItemWorld, run_async};
use etms::work_item::{domain::WorkItemStatus, services::CreateTaskRequest};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the administrator creates {count:u64} tasks for the manager")]
fn administrator_creates_tasks(world: &mut WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    let team = world.team()?.clone();
    for index in 1..=count {
        let request = CreateTaskRequest::new(format!("Task {index}"), team.manager.id());
        let task = run_async(world.service.create_task(&team.admin, request))
            .wrap_err("create task")?;
        world.tasks.push(task);
    }
    Ok(())
}

#[when("the manager adds {count:u64} subtasks for the staff member")]
fn manager_adds_subtasks(world: &mut WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    add_subtasks_for_staff(world, count)
}

#[when(r#"the administrator tries to create a task titled "{title}""#)]
fn administrator_tries_to_create(
    world: &mut WorkItemWorld,
    title: String,
) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let request = CreateTaskRequest::new(title, team.manager.id());
    match run_async(world.service.create_task(&team.admin, request)) {
        Ok(task) => world.tasks.push(task),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}

#[when(r#"the manager marks the task "{status}""#)]
fn manager_marks_task(world: &mut WorkItemWorld, status: String) -> Result<(), eyre::Report> {
    let target = WorkItemStatus::try_from(status.as_str())?;
    let team = world.team()?;
    let task_id = world.current_task()?.id();
    let updated = run_async(
        world
            .service
            .change_task_status(&team.manager, task_id, target),
    )
    .wrap_err("manager status change")?;
    if world.first_completed_at.is_none() {
        world.first_completed_at = updated.completed_at();
    }
    world.tasks.push(updated);
    Ok(())
}

#[when(r#"the staff member marks the task "{status}""#)]
fn staff_marks_task(world: &mut WorkItemWorld, status: String) -> Result<(), eyre::Report> {
    let target = WorkItemStatus::try_from(status.as_str())?;
    let team = world.team()?;
    let task_id = world.current_task()?.id();
    match run_async(world.service.change_task_status(&team.staff, task_id, target)) {
        Ok(task) => world.tasks.push(task),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}

#[when(r#"another staff member marks the subtask "{status}""#)]
fn other_staff_marks_subtask(
    world: &mut WorkItemWorld,
    status: String,
) -> Result<(), eyre::Report> {
    let target = WorkItemStatus::try_from(status.as_str())?;
    let team = world.team()?;
    let subtask_id = world.current_subtask()?.id();
    let outcome = run_async(
        world
            .service
            .change_subtask_status(&team.other_staff, subtask_id, target),
    );
    if let Err(err) = outcome {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when("the administrator deletes the task")]
fn administrator_deletes_task(world: &mut WorkItemWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let task_id = world.current_task()?.id();
    let deleted = run_async(world.service.delete_task(&team.admin, task_id))
        .wrap_err("delete task")?;
    world.deleted = Some(deleted);
    Ok(())
}
