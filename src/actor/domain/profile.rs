//! Roles and role-specific profile payloads.

use super::{ActorDomainError, ActorId, ParseRoleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Organisational role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates tasks and administers the directory.
    Admin,
    /// Owns tasks and breaks them into subtasks.
    Manager,
    /// Works on subtasks assigned by a manager.
    Staff,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Role-specific attributes attached to an actor identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    /// Administrator profile.
    Admin,
    /// Manager profile.
    Manager {
        /// Department the manager leads, if recorded.
        department: Option<String>,
    },
    /// Staff profile.
    Staff {
        /// Manager the staff member reports to, if assigned.
        manager_id: Option<ActorId>,
        /// Job title, if recorded.
        position: Option<String>,
    },
}

impl RoleProfile {
    /// Creates a manager profile, validating the optional department.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDomainError::BlankProfileField`] when the department is
    /// present but blank.
    pub fn manager(department: Option<String>) -> Result<Self, ActorDomainError> {
        Ok(Self::Manager {
            department: normalize_optional(department, "department")?,
        })
    }

    /// Creates a staff profile, validating the optional position.
    ///
    /// # Errors
    ///
    /// Returns [`ActorDomainError::BlankProfileField`] when the position is
    /// present but blank.
    pub fn staff(
        manager_id: Option<ActorId>,
        position: Option<String>,
    ) -> Result<Self, ActorDomainError> {
        Ok(Self::Staff {
            manager_id,
            position: normalize_optional(position, "position")?,
        })
    }

    /// Returns the role this profile belongs to.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Manager { .. } => Role::Manager,
            Self::Staff { .. } => Role::Staff,
        }
    }

    /// Returns the reporting manager for staff profiles.
    #[must_use]
    pub const fn manager_id(&self) -> Option<ActorId> {
        match self {
            Self::Staff { manager_id, .. } => *manager_id,
            Self::Admin | Self::Manager { .. } => None,
        }
    }
}

fn normalize_optional(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, ActorDomainError> {
    match value {
        None => Ok(None),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ActorDomainError::BlankProfileField(field));
            }
            Ok(Some(trimmed.to_owned()))
        }
    }
}
