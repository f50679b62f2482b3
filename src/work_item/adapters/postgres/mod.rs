//! `PostgreSQL` adapters for work-item ports.

mod collaboration;
mod counter;
mod models;
mod repository;
pub(crate) mod schema;

pub use counter::PostgresSequenceCounter;
pub use repository::PostgresWorkItemRepository;
