//! Port contracts for the actor directory.

pub mod assignments;
pub mod repository;

pub use assignments::{AssignmentLookup, AssignmentLookupError, AssignmentLookupResult};
pub use repository::{ActorRepository, ActorRepositoryError, ActorRepositoryResult};
