//! `PostgreSQL` adapters for the actor directory.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::PostgresActorRepository;
