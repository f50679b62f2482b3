//! Work-item management: tasks, subtasks, and their collaboration records.
//!
//! Tasks are created by administrators and assigned to managers; managers
//! break tasks into subtasks for their staff. Every work item carries a
//! human-readable sequential identifier (`T0001`, `ST0001`) allocated during
//! creation under a per-kind uniqueness constraint. The module follows
//! hexagonal architecture:
//!
//! - Domain types and access rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services, including identifier allocation, in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
