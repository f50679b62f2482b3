//! Report value types.

mod report;
mod window;

pub use report::{AssigneeWorkload, OverdueItem, StatusCounts, WorkloadReport};
pub use window::{ReportWindow, ReportWindowError};
