//! Role and ownership checks for work-item operations.
//!
//! Every function here is pure: it reads the acting [`Actor`] and the records
//! involved and either permits the action or reports why not. Services call
//! these before any state change so a refusal never leaves partial writes.

use super::{Subtask, Task};
use crate::actor::domain::{Actor, ActorId, Role};
use std::fmt;
use thiserror::Error;

/// Operation being authorised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkItemAction {
    /// Create a task.
    CreateTask,
    /// Change a task's status.
    ChangeTaskStatus,
    /// Reassign a task to another manager.
    ReassignTask,
    /// Edit a task's descriptive fields.
    EditTask,
    /// Delete a task and its subtasks.
    DeleteTask,
    /// Create a subtask under a task.
    CreateSubtask,
    /// Change a subtask's status.
    ChangeSubtaskStatus,
    /// Assign, reassign, or unassign a subtask.
    AssignSubtask,
    /// Delete a subtask.
    DeleteSubtask,
    /// Read a work item, its comments, or its attachments.
    View,
    /// Comment on or attach files to a work item.
    Collaborate,
}

impl WorkItemAction {
    /// Returns a stable name for logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTask => "create_task",
            Self::ChangeTaskStatus => "change_task_status",
            Self::ReassignTask => "reassign_task",
            Self::EditTask => "edit_task",
            Self::DeleteTask => "delete_task",
            Self::CreateSubtask => "create_subtask",
            Self::ChangeSubtaskStatus => "change_subtask_status",
            Self::AssignSubtask => "assign_subtask",
            Self::DeleteSubtask => "delete_subtask",
            Self::View => "view",
            Self::Collaborate => "collaborate",
        }
    }
}

impl fmt::Display for WorkItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorisation failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The actor's role or ownership does not cover the action.
    #[error("actor {actor} is not permitted to {action}")]
    AuthorizationMismatch {
        /// Acting actor.
        actor: ActorId,
        /// Refused action.
        action: WorkItemAction,
    },

    /// The proposed assignee does not hold the role the work item requires.
    #[error("actor {assignee} cannot be assigned this work item; a {required} is required")]
    InvalidAssignee {
        /// Proposed assignee.
        assignee: ActorId,
        /// Role the assignee must hold.
        required: Role,
    },
}

const fn deny(actor: &Actor, action: WorkItemAction) -> AccessError {
    AccessError::AuthorizationMismatch {
        actor: actor.id(),
        action,
    }
}

fn permit_if(allowed: bool, actor: &Actor, action: WorkItemAction) -> Result<(), AccessError> {
    if allowed {
        Ok(())
    } else {
        Err(deny(actor, action))
    }
}

/// Only administrators create tasks.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for non-administrators.
pub fn ensure_can_create_task(actor: &Actor) -> Result<(), AccessError> {
    permit_if(actor.is_admin(), actor, WorkItemAction::CreateTask)
}

/// Task assignees must be managers.
///
/// # Errors
///
/// Returns [`AccessError::InvalidAssignee`] for any other role.
pub fn ensure_task_assignee(assignee: &Actor) -> Result<(), AccessError> {
    require_role(assignee, Role::Manager)
}

/// Subtask assignees must be staff.
///
/// # Errors
///
/// Returns [`AccessError::InvalidAssignee`] for any other role.
pub fn ensure_subtask_assignee(assignee: &Actor) -> Result<(), AccessError> {
    require_role(assignee, Role::Staff)
}

fn require_role(assignee: &Actor, required: Role) -> Result<(), AccessError> {
    if assignee.role() == required {
        Ok(())
    } else {
        Err(AccessError::InvalidAssignee {
            assignee: assignee.id(),
            required,
        })
    }
}

/// Administrators and the assigned manager may change a task's status.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for anyone else.
pub fn ensure_can_change_task_status(actor: &Actor, task: &Task) -> Result<(), AccessError> {
    permit_if(
        actor.is_admin() || task.assigned_to() == actor.id(),
        actor,
        WorkItemAction::ChangeTaskStatus,
    )
}

/// Reassigning, editing, and deleting tasks are administrator actions.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for non-administrators.
pub fn ensure_task_admin(actor: &Actor, action: WorkItemAction) -> Result<(), AccessError> {
    permit_if(actor.is_admin(), actor, action)
}

/// Administrators and the manager the task is assigned to may create
/// subtasks under it.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for anyone else.
pub fn ensure_can_create_subtask(actor: &Actor, task: &Task) -> Result<(), AccessError> {
    let owns_task = actor.role() == Role::Manager && task.assigned_to() == actor.id();
    permit_if(
        actor.is_admin() || owns_task,
        actor,
        WorkItemAction::CreateSubtask,
    )
}

/// Administrators, the subtask's creator, and its assignee may change its
/// status.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for anyone else, including
/// staff acting on a subtask assigned to someone else.
pub fn ensure_can_change_subtask_status(
    actor: &Actor,
    subtask: &Subtask,
) -> Result<(), AccessError> {
    let allowed = actor.is_admin()
        || subtask.created_by() == actor.id()
        || subtask.assigned_to() == Some(actor.id());
    permit_if(allowed, actor, WorkItemAction::ChangeSubtaskStatus)
}

/// Administrators and the subtask's creator may assign or delete it.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] for anyone else.
pub fn ensure_can_manage_subtask(
    actor: &Actor,
    subtask: &Subtask,
    action: WorkItemAction,
) -> Result<(), AccessError> {
    permit_if(
        actor.is_admin() || subtask.created_by() == actor.id(),
        actor,
        action,
    )
}

/// Returns `true` when the actor may see the task.
///
/// `holds_subtask` says whether the actor is assigned at least one subtask
/// under the task; staff see exactly those parent tasks.
#[must_use]
pub fn can_view_task(actor: &Actor, task: &Task, holds_subtask: bool) -> bool {
    match actor.role() {
        Role::Admin => true,
        Role::Manager => task.assigned_to() == actor.id(),
        Role::Staff => holds_subtask,
    }
}

/// Returns `true` when the actor may see the subtask under `parent`.
#[must_use]
pub fn can_view_subtask(actor: &Actor, parent: &Task, subtask: &Subtask) -> bool {
    match actor.role() {
        Role::Admin => true,
        Role::Manager => parent.assigned_to() == actor.id() || subtask.created_by() == actor.id(),
        Role::Staff => subtask.assigned_to() == Some(actor.id()),
    }
}

/// Converts a visibility decision into an error for `action`.
///
/// # Errors
///
/// Returns [`AccessError::AuthorizationMismatch`] when `visible` is false.
pub fn ensure_visible(
    actor: &Actor,
    visible: bool,
    action: WorkItemAction,
) -> Result<(), AccessError> {
    permit_if(visible, actor, action)
}
