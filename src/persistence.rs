//! Shared `PostgreSQL` plumbing for the Diesel adapters.
//!
//! Every `PostgreSQL` repository in the crate shares one r2d2 pool type and
//! offloads synchronous Diesel calls onto the blocking thread pool.

use crate::config::DatabaseConfig;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type for internal use.
pub(crate) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// SQL creating the full ETMS schema.
pub const SCHEMA_SQL: &str =
    include_str!("../migrations/2026-10-01-000000_create_etms_tables/up.sql");

/// Errors raised while preparing database access.
#[derive(Debug, Error)]
pub enum PersistenceSetupError {
    /// No database URL was configured.
    #[error("no database URL configured")]
    MissingDatabaseUrl,
    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// Applying the schema failed.
    #[error("failed to apply schema: {0}")]
    Schema(#[from] diesel::result::Error),
}

/// Builds a connection pool from database configuration.
///
/// # Errors
///
/// Returns [`PersistenceSetupError::MissingDatabaseUrl`] when no URL is set or
/// [`PersistenceSetupError::Pool`] when the pool cannot connect.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, PersistenceSetupError> {
    let url = config
        .url
        .as_deref()
        .ok_or(PersistenceSetupError::MissingDatabaseUrl)?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(manager)?;
    tracing::info!(pool_size = config.pool_size, "database pool ready");
    Ok(pool)
}

/// Applies the ETMS schema to an empty database.
///
/// # Errors
///
/// Returns [`PersistenceSetupError::Schema`] when any statement fails.
pub fn apply_schema(connection: &mut PgConnection) -> Result<(), PersistenceSetupError> {
    connection.batch_execute(SCHEMA_SQL)?;
    Ok(())
}

/// Runs a blocking database operation on the blocking thread pool and maps
/// join errors into the caller's error type.
pub(crate) async fn run_blocking_with<F, T, E, M>(f: F, map_err: M) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    M: FnOnce(tokio::task::JoinError) -> E,
{
    tokio::task::spawn_blocking(f).await.map_err(map_err)?
}

/// Obtains a connection from the pool with a caller-provided error mapper.
pub(crate) fn get_conn_with<E, M>(pool: &PgPool, map_err: M) -> Result<PooledConn, E>
where
    M: FnOnce(PoolError) -> E,
{
    pool.get().map_err(map_err)
}
