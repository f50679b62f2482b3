//! Domain model for the actor directory.
//!
//! An actor is one identity with a polymorphic role profile. Authorisation
//! decisions elsewhere in the crate read the role straight from the profile
//! rather than joining per-role records.

mod actor;
mod error;
mod ids;
mod profile;

pub use actor::{Actor, PersistedActorData};
pub use error::{ActorDomainError, ParseRoleError};
pub use ids::{ActorId, EmailAddress};
pub use profile::{Role, RoleProfile};
