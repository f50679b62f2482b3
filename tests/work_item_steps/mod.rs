//! Step definitions for work-item lifecycle scenarios.

pub mod world;

mod given;
mod then;
mod when;
