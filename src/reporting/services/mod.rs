//! Report computation and rendering.

mod render;
mod workload;

pub use render::render_text;
pub use workload::{ReportService, ReportingError, ReportingResult};
