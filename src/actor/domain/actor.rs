//! Actor aggregate.

use super::{ActorDomainError, ActorId, EmailAddress, Role, RoleProfile};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A person known to the system, with a role-specific profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    display_name: String,
    email: EmailAddress,
    profile: RoleProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActorData {
    /// Persisted actor identifier.
    pub id: ActorId,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted e-mail address.
    pub email: EmailAddress,
    /// Persisted role profile.
    pub profile: RoleProfile,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Actor {
    /// Creates a new actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDomainError::EmptyDisplayName`] when the display name is
    /// blank.
    pub fn new(
        display_name: impl Into<String>,
        email: EmailAddress,
        profile: RoleProfile,
        clock: &impl Clock,
    ) -> Result<Self, ActorDomainError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ActorDomainError::EmptyDisplayName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ActorId::new(),
            display_name: trimmed.to_owned(),
            email,
            profile,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an actor from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActorData) -> Self {
        Self {
            id: data.id,
            display_name: data.display_name,
            email: data.email,
            profile: data.profile,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the actor identifier.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the e-mail address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the role profile.
    #[must_use]
    pub const fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role()
    }

    /// Returns `true` when the actor is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.profile, RoleProfile::Admin)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the role profile.
    pub fn replace_profile(&mut self, profile: RoleProfile, clock: &impl Clock) {
        self.profile = profile;
        self.updated_at = clock.utc();
    }
}
