//! Service layer for actor registration and lookup.

use crate::actor::{
    domain::{Actor, ActorDomainError, ActorId, EmailAddress, Role, RoleProfile},
    ports::{ActorRepository, ActorRepositoryError, AssignmentLookup, AssignmentLookupError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for registering an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterActorRequest {
    display_name: String,
    email: String,
    role: Role,
    department: Option<String>,
    manager_id: Option<ActorId>,
    position: Option<String>,
}

impl RegisterActorRequest {
    /// Creates a request with the required identity fields.
    #[must_use]
    pub fn new(display_name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            role,
            department: None,
            manager_id: None,
            position: None,
        }
    }

    /// Sets the department (manager profiles only).
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Sets the reporting manager (staff profiles only).
    #[must_use]
    pub const fn with_manager(mut self, manager_id: ActorId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    /// Sets the job title (staff profiles only).
    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// Service-level errors for directory operations.
#[derive(Debug, Error)]
pub enum ActorDirectoryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ActorDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ActorRepositoryError),
    /// Only administrators may perform the operation.
    #[error("actor {0} is not permitted to administer the directory")]
    AuthorizationMismatch(ActorId),
    /// An administrator already exists, so bootstrap is closed.
    #[error("an administrator has already been registered")]
    AlreadyBootstrapped,
    /// The referenced manager does not exist or is not a manager.
    #[error("actor {0} is not a registered manager")]
    InvalidManager(ActorId),
    /// The actor was not found.
    #[error("actor not found: {0}")]
    NotFound(ActorId),
    /// The actor's role cannot change while others depend on it.
    #[error(
        "actor {actor} still has {reports} reporting staff and {assignments} assigned work items"
    )]
    RoleInUse {
        /// Actor whose role change was refused.
        actor: ActorId,
        /// Staff still reporting to the actor.
        reports: usize,
        /// Tasks and subtasks still assigned to the actor.
        assignments: usize,
    },
    /// The change would leave the directory without an administrator.
    #[error("actor {0} is the last administrator")]
    LastAdministrator(ActorId),
    /// Assigned work could not be checked.
    #[error(transparent)]
    Assignments(#[from] AssignmentLookupError),
}

/// Result type for directory service operations.
pub type ActorDirectoryResult<T> = Result<T, ActorDirectoryError>;

/// Actor registration and lookup service.
#[derive(Clone)]
pub struct ActorDirectoryService<R, L, C>
where
    R: ActorRepository,
    L: AssignmentLookup,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    assignments: Arc<L>,
    clock: Arc<C>,
}

impl<R, L, C> ActorDirectoryService<R, L, C>
where
    R: ActorRepository,
    L: AssignmentLookup,
    C: Clock + Send + Sync,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(repository: Arc<R>, assignments: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            repository,
            assignments,
            clock,
        }
    }

    /// Registers the first administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::AlreadyBootstrapped`] once any
    /// administrator exists, or a domain/repository error.
    pub async fn bootstrap_admin(
        &self,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> ActorDirectoryResult<Actor> {
        if !self.repository.list_by_role(Role::Admin).await?.is_empty() {
            return Err(ActorDirectoryError::AlreadyBootstrapped);
        }
        let actor = Actor::new(
            display_name,
            EmailAddress::new(email)?,
            RoleProfile::Admin,
            &*self.clock,
        )?;
        self.repository.store(&actor).await?;
        info!(actor_id = %actor.id(), "bootstrapped administrator");
        Ok(actor)
    }

    /// Registers a new actor on behalf of an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::AuthorizationMismatch`] when the
    /// performer is not an administrator,
    /// [`ActorDirectoryError::InvalidManager`] when a staff profile names an
    /// actor that is not a manager, or a domain/repository error.
    pub async fn register(
        &self,
        performed_by: &Actor,
        request: RegisterActorRequest,
    ) -> ActorDirectoryResult<Actor> {
        ensure_admin(performed_by)?;
        let RegisterActorRequest {
            display_name,
            email,
            role,
            department,
            manager_id,
            position,
        } = request;

        let profile = self.build_profile(role, department, manager_id, position).await?;
        let actor = Actor::new(display_name, EmailAddress::new(email)?, profile, &*self.clock)?;
        self.repository.store(&actor).await?;
        info!(
            actor_id = %actor.id(),
            role = %actor.role(),
            registered_by = %performed_by.id(),
            "registered actor"
        );
        Ok(actor)
    }

    /// Replaces an actor's role profile on behalf of an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::AuthorizationMismatch`] for
    /// non-administrators, [`ActorDirectoryError::NotFound`] for unknown
    /// actors, and [`ActorDirectoryError::InvalidManager`] for a bad manager
    /// reference. A role change is refused with
    /// [`ActorDirectoryError::RoleInUse`] while staff report to the actor or
    /// work is assigned to it, and with
    /// [`ActorDirectoryError::LastAdministrator`] when it would remove the
    /// only administrator.
    pub async fn update_profile(
        &self,
        performed_by: &Actor,
        actor_id: ActorId,
        profile: RoleProfile,
    ) -> ActorDirectoryResult<Actor> {
        ensure_admin(performed_by)?;
        let mut actor = self
            .repository
            .find_by_id(actor_id)
            .await?
            .ok_or(ActorDirectoryError::NotFound(actor_id))?;
        if let Some(manager_id) = profile.manager_id() {
            self.ensure_manager(manager_id).await?;
        }
        let previous = actor.role();
        if previous != profile.role() {
            self.ensure_role_can_change(&actor).await?;
        }
        actor.replace_profile(profile, &*self.clock);
        self.repository.update(&actor).await?;
        info!(
            actor_id = %actor.id(),
            from = %previous,
            to = %actor.role(),
            updated_by = %performed_by.id(),
            "updated actor profile"
        );
        Ok(actor)
    }

    /// Finds an actor by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: ActorId) -> ActorDirectoryResult<Option<Actor>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Finds an actor by e-mail address.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::Domain`] for a malformed address or
    /// [`ActorDirectoryError::Repository`] when the lookup fails.
    pub async fn find_by_email(&self, email: &str) -> ActorDirectoryResult<Option<Actor>> {
        let address = EmailAddress::new(email)?;
        Ok(self.repository.find_by_email(&address).await?)
    }

    /// Lists actors holding a role.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::Repository`] when the lookup fails.
    pub async fn list_by_role(&self, role: Role) -> ActorDirectoryResult<Vec<Actor>> {
        Ok(self.repository.list_by_role(role).await?)
    }

    /// Lists the staff reporting to a manager.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDirectoryError::Repository`] when the lookup fails.
    pub async fn list_team(&self, manager_id: ActorId) -> ActorDirectoryResult<Vec<Actor>> {
        Ok(self.repository.list_reports(manager_id).await?)
    }

    async fn build_profile(
        &self,
        role: Role,
        department: Option<String>,
        manager_id: Option<ActorId>,
        position: Option<String>,
    ) -> ActorDirectoryResult<RoleProfile> {
        let profile = match role {
            Role::Admin => RoleProfile::Admin,
            Role::Manager => RoleProfile::manager(department)?,
            Role::Staff => {
                if let Some(id) = manager_id {
                    self.ensure_manager(id).await?;
                }
                RoleProfile::staff(manager_id, position)?
            }
        };
        Ok(profile)
    }

    async fn ensure_role_can_change(&self, actor: &Actor) -> ActorDirectoryResult<()> {
        let actor_id = actor.id();
        if actor.is_admin() {
            let admins = self.repository.list_by_role(Role::Admin).await?;
            if admins.len() <= 1 {
                return Err(ActorDirectoryError::LastAdministrator(actor_id));
            }
            return Ok(());
        }
        let reports = if actor.role() == Role::Manager {
            self.repository.list_reports(actor_id).await?.len()
        } else {
            0
        };
        let assignments = self.assignments.assigned_work_count(actor_id).await?;
        if reports > 0 || assignments > 0 {
            return Err(ActorDirectoryError::RoleInUse {
                actor: actor_id,
                reports,
                assignments,
            });
        }
        Ok(())
    }

    async fn ensure_manager(&self, manager_id: ActorId) -> ActorDirectoryResult<()> {
        let manager = self.repository.find_by_id(manager_id).await?;
        match manager {
            Some(actor) if actor.role() == Role::Manager => Ok(()),
            _ => Err(ActorDirectoryError::InvalidManager(manager_id)),
        }
    }
}

fn ensure_admin(actor: &Actor) -> ActorDirectoryResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ActorDirectoryError::AuthorizationMismatch(actor.id()))
    }
}
