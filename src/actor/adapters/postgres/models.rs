//! Diesel row models for actor persistence.

use super::schema::actors;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for actor records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = actors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActorRow {
    pub id: uuid::Uuid,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub profile: Value,
    pub manager_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for actor records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = actors)]
#[diesel(treat_none_as_null = true)]
pub struct NewActorRow {
    pub id: uuid::Uuid,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub profile: Value,
    pub manager_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
