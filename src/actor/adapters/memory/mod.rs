//! In-memory adapters for the actor directory.

mod actor;

pub use actor::InMemoryActorRepository;
