//! ETMS: employee task management backend.
//!
//! Administrators create tasks and hand them to managers, managers split
//! tasks into subtasks for their staff, and everyone involved tracks status,
//! comments, and attachments. Every task and subtask carries a sequential
//! human-readable identifier (`T0001`, `ST0001`) that is unique per kind even
//! under concurrent creation.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and storage
//! - **Adapters**: In-memory, `PostgreSQL`, and filesystem implementations
//!
//! # Modules
//!
//! - [`actor`]: Identities and their admin/manager/staff role profiles
//! - [`work_item`]: Tasks, subtasks, identifier allocation, and collaboration
//! - [`reporting`]: Workload summaries scoped to the requesting actor
//! - [`config`]: Runtime configuration
//! - [`persistence`]: Connection pooling and schema setup

pub mod actor;
pub mod config;
pub mod persistence;
pub mod reporting;
pub mod work_item;

#[cfg(test)]
mod test_support;
