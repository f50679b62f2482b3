//! Per-test databases and service wiring for `PostgreSQL` tests.

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use etms::actor::adapters::postgres::PostgresActorRepository;
use etms::config::DatabaseConfig;
use etms::persistence::{PgPool, apply_schema, build_pool};
use etms::work_item::{
    adapters::postgres::{PostgresSequenceCounter, PostgresWorkItemRepository},
    services::{ExternalIdAllocator, WorkItemService},
};
use mockable::DefaultClock;
use uuid::Uuid;

pub use super::cluster::BoxError;
use super::cluster::shared_cluster;
use crate::test_helpers::{Team, seed_team};

pub type PgService = WorkItemService<
    PostgresWorkItemRepository,
    PostgresActorRepository,
    PostgresSequenceCounter,
    DefaultClock,
>;

/// A freshly created database with the schema applied and a team stored.
pub struct PreparedDb {
    pub pool: PgPool,
    pub repository: Arc<PostgresWorkItemRepository>,
    pub actors: Arc<PostgresActorRepository>,
    pub team: Team,
}

impl PreparedDb {
    /// Work-item service backed by the database counter.
    #[must_use]
    pub fn service(&self) -> PgService {
        WorkItemService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.actors),
            ExternalIdAllocator::new(Arc::new(PostgresSequenceCounter::new(self.pool.clone()))),
            Arc::new(DefaultClock),
        )
    }
}

/// Creates an isolated database, or returns `None` when no cluster is
/// available.
///
/// # Errors
///
/// Returns an error when the database cannot be created or seeded.
pub async fn prepared_db() -> Result<Option<PreparedDb>, eyre::Report> {
    let Some(cluster) = tokio::task::block_in_place(shared_cluster) else {
        return Ok(None);
    };
    let name = format!("etms_{}", Uuid::new_v4().simple());
    let url = cluster.database_url(&name);

    let pool = tokio::task::spawn_blocking(move || -> Result<PgPool, BoxError> {
        cluster.create_database(&name)?;
        let mut connection = PgConnection::establish(&url)?;
        apply_schema(&mut connection)?;
        let config = DatabaseConfig {
            url: Some(url),
            pool_size: 4,
        };
        Ok(build_pool(&config)?)
    })
    .await?
    .map_err(|err| eyre::eyre!("database setup failed: {err}"))?;

    let repository = Arc::new(PostgresWorkItemRepository::new(pool.clone()));
    let actors = Arc::new(PostgresActorRepository::new(pool.clone()));
    let team = seed_team(actors.as_ref()).await?;
    Ok(Some(PreparedDb {
        pool,
        repository,
        actors,
        team,
    }))
}
