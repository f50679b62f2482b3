//! Given steps for work-item lifecycle scenarios.

use super::world::{WorkItemWorld, run_async};
use crate::test_helpers::seed_team;
use etms::work_item::{
    domain::{ExternalId, NewTask, Task},
    ports::WorkItemRepository,
    services::{CreateSubtaskRequest, CreateTaskRequest},
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given("an organisation with an administrator, a manager and a staff member")]
fn organisation(world: &mut WorkItemWorld) -> Result<(), eyre::Report> {
    let team = run_async(seed_team(world.actors.as_ref()))?;
    world.team = Some(team);
    Ok(())
}

#[given(r#"the manager has a task titled "{title}""#)]
fn manager_has_task(world: &mut WorkItemWorld, title: String) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let request = CreateTaskRequest::new(title, team.manager.id());
    let task = run_async(world.service.create_task(&team.admin, request))
        .wrap_err("create task for scenario setup")?;
    world.tasks.push(task);
    Ok(())
}

#[given(r#"a task "{external_id}" already exists"#)]
fn task_already_exists(
    world: &mut WorkItemWorld,
    external_id: String,
) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let id: ExternalId = external_id.parse().wrap_err("parse seeded identifier")?;
    let draft = NewTask::new("Imported", team.admin.id(), team.manager.id())?;
    let task = Task::create(draft, id, &DefaultClock)?;
    run_async(world.repository.store_task(&task)).wrap_err("store seeded task")?;
    Ok(())
}

#[given("the sequence source always proposes {value:u64}")]
fn sequence_always_proposes(world: &mut WorkItemWorld, value: u64) {
    world.sequence.pin(value);
}

#[given("the manager has added {count:u64} subtasks for the staff member")]
fn manager_has_added_subtasks(world: &mut WorkItemWorld, count: u64) -> Result<(), eyre::Report> {
    add_subtasks_for_staff(world, count)
}

/// Has the manager add `count` subtasks to the current task, all assigned to
/// the staff member.
pub(super) fn add_subtasks_for_staff(
    world: &mut WorkItemWorld,
    count: u64,
) -> Result<(), eyre::Report> {
    let team = world.team()?.clone();
    let task_id = world.current_task()?.id();
    for index in 1..=count {
        let request = CreateSubtaskRequest::new(task_id, format!("Step {index}"))
            .with_assignee(team.staff.id());
        let subtask = run_async(world.service.create_subtask(&team.manager, request))
            .wrap_err("create subtask")?;
        world.subtasks.push(subtask);
    }
    Ok(())
}
