//! Repository port for actor persistence and lookup.

use crate::actor::domain::{Actor, ActorId, EmailAddress, Role};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for actor repository operations.
pub type ActorRepositoryResult<T> = Result<T, ActorRepositoryError>;

/// Actor persistence contract.
#[async_trait]
pub trait ActorRepository: Send + Sync {
    /// Stores a new actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorRepositoryError::DuplicateActor`] when the identifier
    /// already exists or [`ActorRepositoryError::DuplicateEmail`] when the
    /// e-mail address is taken.
    async fn store(&self, actor: &Actor) -> ActorRepositoryResult<()>;

    /// Persists changes to an existing actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorRepositoryError::NotFound`] when the actor does not
    /// exist.
    async fn update(&self, actor: &Actor) -> ActorRepositoryResult<()>;

    /// Finds an actor by identifier.
    async fn find_by_id(&self, id: ActorId) -> ActorRepositoryResult<Option<Actor>>;

    /// Finds an actor by e-mail address.
    async fn find_by_email(&self, email: &EmailAddress) -> ActorRepositoryResult<Option<Actor>>;

    /// Lists actors holding the given role, ordered by display name.
    async fn list_by_role(&self, role: Role) -> ActorRepositoryResult<Vec<Actor>>;

    /// Lists staff actors reporting to the given manager, ordered by display
    /// name.
    async fn list_reports(&self, manager_id: ActorId) -> ActorRepositoryResult<Vec<Actor>>;
}

/// Errors returned by actor repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ActorRepositoryError {
    /// An actor with the same identifier already exists.
    #[error("duplicate actor identifier: {0}")]
    DuplicateActor(ActorId),

    /// Another actor already uses the e-mail address.
    #[error("duplicate e-mail address: {0}")]
    DuplicateEmail(EmailAddress),

    /// The actor was not found.
    #[error("actor not found: {0}")]
    NotFound(ActorId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActorRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
