//! Error types for actor domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing actor domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActorDomainError {
    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The e-mail address is malformed.
    #[error("invalid e-mail address '{0}'")]
    InvalidEmail(String),

    /// An optional profile text field was present but blank.
    #[error("profile field '{0}' must not be blank when provided")]
    BlankProfileField(&'static str),
}

/// Error returned while parsing roles from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
