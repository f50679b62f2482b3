//! Workload reporting over the work items an actor may see.
//!
//! Reports are computed from the same visibility rules as the work-item
//! service, so a manager's report covers its tasks and the subtasks under
//! them, and a staff member's report covers its own subtasks.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
