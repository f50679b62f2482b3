//! `PostgreSQL` repository implementation for the actor directory.

use super::{
    models::{ActorRow, NewActorRow},
    schema::actors,
};
use crate::actor::{
    domain::{Actor, ActorId, EmailAddress, PersistedActorData, Role, RoleProfile},
    ports::{ActorRepository, ActorRepositoryError, ActorRepositoryResult},
};
use crate::persistence::{PgPool, get_conn_with, run_blocking_with};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const EMAIL_UNIQUE_CONSTRAINT: &str = "actors_email_key";

/// `PostgreSQL`-backed actor repository.
#[derive(Debug, Clone)]
pub struct PostgresActorRepository {
    pool: PgPool,
}

impl PostgresActorRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ActorRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActorRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, ActorRepositoryError::persistence)?;
                f(&mut connection)
            },
            ActorRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl ActorRepository for PostgresActorRepository {
    async fn store(&self, actor: &Actor) -> ActorRepositoryResult<()> {
        let actor_id = actor.id();
        let email = actor.email().clone();
        let row = to_row(actor)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(actors::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, actor_id, &email))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, actor: &Actor) -> ActorRepositoryResult<()> {
        let actor_id = actor.id();
        let email = actor.email().clone();
        let row = to_row(actor)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(actors::table.find(actor_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, actor_id, &email))?;
            if affected == 0 {
                return Err(ActorRepositoryError::NotFound(actor_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ActorId) -> ActorRepositoryResult<Option<Actor>> {
        self.run_blocking(move |connection| {
            let row = actors::table
                .find(id.into_inner())
                .select(ActorRow::as_select())
                .first::<ActorRow>(connection)
                .optional()
                .map_err(ActorRepositoryError::persistence)?;
            row.map(row_to_actor).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> ActorRepositoryResult<Option<Actor>> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = actors::table
                .filter(actors::email.eq(lookup))
                .select(ActorRow::as_select())
                .first::<ActorRow>(connection)
                .optional()
                .map_err(ActorRepositoryError::persistence)?;
            row.map(row_to_actor).transpose()
        })
        .await
    }

    async fn list_by_role(&self, role: Role) -> ActorRepositoryResult<Vec<Actor>> {
        self.run_blocking(move |connection| {
            let rows = actors::table
                .filter(actors::role.eq(role.as_str()))
                .order(actors::display_name.asc())
                .select(ActorRow::as_select())
                .load::<ActorRow>(connection)
                .map_err(ActorRepositoryError::persistence)?;
            rows.into_iter().map(row_to_actor).collect()
        })
        .await
    }

    async fn list_reports(&self, manager_id: ActorId) -> ActorRepositoryResult<Vec<Actor>> {
        self.run_blocking(move |connection| {
            let rows = actors::table
                .filter(actors::manager_id.eq(manager_id.into_inner()))
                .order(actors::display_name.asc())
                .select(ActorRow::as_select())
                .load::<ActorRow>(connection)
                .map_err(ActorRepositoryError::persistence)?;
            rows.into_iter().map(row_to_actor).collect()
        })
        .await
    }
}

fn map_write_error(
    err: DieselError,
    actor_id: ActorId,
    email: &EmailAddress,
) -> ActorRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.constraint_name() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            ActorRepositoryError::DuplicateEmail(email.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ActorRepositoryError::DuplicateActor(actor_id)
        }
        _ => ActorRepositoryError::persistence(err),
    }
}

fn to_row(actor: &Actor) -> ActorRepositoryResult<NewActorRow> {
    let profile =
        serde_json::to_value(actor.profile()).map_err(ActorRepositoryError::persistence)?;
    Ok(NewActorRow {
        id: actor.id().into_inner(),
        display_name: actor.display_name().to_owned(),
        email: actor.email().as_str().to_owned(),
        role: actor.role().as_str().to_owned(),
        profile,
        manager_id: actor.profile().manager_id().map(ActorId::into_inner),
        created_at: actor.created_at(),
        updated_at: actor.updated_at(),
    })
}

fn row_to_actor(row: ActorRow) -> ActorRepositoryResult<Actor> {
    let ActorRow {
        id,
        display_name,
        email: persisted_email,
        profile: persisted_profile,
        created_at,
        updated_at,
        ..
    } = row;

    let email = EmailAddress::new(persisted_email).map_err(ActorRepositoryError::persistence)?;
    let profile = serde_json::from_value::<RoleProfile>(persisted_profile)
        .map_err(ActorRepositoryError::persistence)?;

    Ok(Actor::from_persisted(PersistedActorData {
        id: ActorId::from_uuid(id),
        display_name,
        email,
        profile,
        created_at,
        updated_at,
    }))
}
