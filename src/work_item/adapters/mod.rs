//! Adapter implementations for work-item ports.

pub mod assignments;
pub mod filesystem;
pub mod max_scan;
pub mod memory;
pub mod postgres;

pub use assignments::WorkItemAssignments;
