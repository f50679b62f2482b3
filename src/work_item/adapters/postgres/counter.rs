//! Atomic per-kind counter stored in `work_item_counters`.

use super::schema::{subtasks, tasks, work_item_counters};
use crate::persistence::{PgPool, get_conn_with, run_blocking_with};
use crate::work_item::{
    domain::{SequenceNumber, WorkItemKind},
    ports::{SequenceSource, WorkItemRepositoryError, WorkItemRepositoryResult},
};
use async_trait::async_trait;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// Counter-backed [`SequenceSource`] for `PostgreSQL`.
///
/// The first call for a kind seeds its counter from the highest stored
/// sequence, so switching from scan-based allocation does not reissue
/// numbers. Each call then increments under the row lock and returns the
/// new value.
#[derive(Debug, Clone)]
pub struct PostgresSequenceCounter {
    pool: PgPool,
}

impl PostgresSequenceCounter {
    /// Creates a counter from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn highest_stored(
    connection: &mut PgConnection,
    kind: WorkItemKind,
) -> Result<Option<i64>, DieselError> {
    match kind {
        WorkItemKind::Task => tasks::table
            .select(max(tasks::sequence_number))
            .first::<Option<i64>>(connection),
        WorkItemKind::Subtask => subtasks::table
            .select(max(subtasks::sequence_number))
            .first::<Option<i64>>(connection),
    }
}

fn increment(connection: &mut PgConnection, kind: WorkItemKind) -> Result<i64, DieselError> {
    connection.transaction(|tx| {
        let floor = highest_stored(tx, kind)?.unwrap_or(0);
        diesel::insert_into(work_item_counters::table)
            .values((
                work_item_counters::kind.eq(kind.as_str()),
                work_item_counters::value.eq(floor),
            ))
            .on_conflict_do_nothing()
            .execute(tx)?;
        diesel::update(work_item_counters::table.find(kind.as_str()))
            .set(work_item_counters::value.eq(work_item_counters::value + 1))
            .returning(work_item_counters::value)
            .get_result::<i64>(tx)
    })
}

#[async_trait]
impl SequenceSource for PostgresSequenceCounter {
    async fn next_sequence(&self, kind: WorkItemKind) -> WorkItemRepositoryResult<SequenceNumber> {
        let pool = self.pool.clone();
        let value = run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, WorkItemRepositoryError::persistence)?;
                increment(&mut connection, kind).map_err(WorkItemRepositoryError::persistence)
            },
            WorkItemRepositoryError::persistence,
        )
        .await?;
        let unsigned = u64::try_from(value).map_err(WorkItemRepositoryError::persistence)?;
        SequenceNumber::new(unsigned).map_err(WorkItemRepositoryError::persistence)
    }
}
