//! In-memory repository for actor directory tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::actor::{
    domain::{Actor, ActorId, EmailAddress, Role},
    ports::{ActorRepository, ActorRepositoryError, ActorRepositoryResult},
};

/// Thread-safe in-memory actor repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActorRepository {
    state: Arc<RwLock<InMemoryActorState>>,
}

#[derive(Debug, Default)]
struct InMemoryActorState {
    actors: HashMap<ActorId, Actor>,
    email_index: HashMap<EmailAddress, ActorId>,
}

impl InMemoryActorRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ActorRepositoryError {
    ActorRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn sorted_by_name(mut actors: Vec<Actor>) -> Vec<Actor> {
    actors.sort_by(|left, right| left.display_name().cmp(right.display_name()));
    actors
}

#[async_trait]
impl ActorRepository for InMemoryActorRepository {
    async fn store(&self, actor: &Actor) -> ActorRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.actors.contains_key(&actor.id()) {
            return Err(ActorRepositoryError::DuplicateActor(actor.id()));
        }
        if state.email_index.contains_key(actor.email()) {
            return Err(ActorRepositoryError::DuplicateEmail(actor.email().clone()));
        }

        state.email_index.insert(actor.email().clone(), actor.id());
        state.actors.insert(actor.id(), actor.clone());
        Ok(())
    }

    async fn update(&self, actor: &Actor) -> ActorRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let previous_email = state
            .actors
            .get(&actor.id())
            .ok_or(ActorRepositoryError::NotFound(actor.id()))?
            .email()
            .clone();

        if &previous_email != actor.email() {
            if state.email_index.contains_key(actor.email()) {
                return Err(ActorRepositoryError::DuplicateEmail(actor.email().clone()));
            }
            state.email_index.remove(&previous_email);
            state.email_index.insert(actor.email().clone(), actor.id());
        }

        state.actors.insert(actor.id(), actor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ActorId) -> ActorRepositoryResult<Option<Actor>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.actors.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> ActorRepositoryResult<Option<Actor>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.actors.get(id))
            .cloned())
    }

    async fn list_by_role(&self, role: Role) -> ActorRepositoryResult<Vec<Actor>> {
        let state = self.state.read().map_err(lock_error)?;
        let actors = state
            .actors
            .values()
            .filter(|actor| actor.role() == role)
            .cloned()
            .collect();
        Ok(sorted_by_name(actors))
    }

    async fn list_reports(&self, manager_id: ActorId) -> ActorRepositoryResult<Vec<Actor>> {
        let state = self.state.read().map_err(lock_error)?;
        let actors = state
            .actors
            .values()
            .filter(|actor| actor.profile().manager_id() == Some(manager_id))
            .cloned()
            .collect();
        Ok(sorted_by_name(actors))
    }
}
