//! Comments left on tasks and subtasks.

use super::{CommentId, WorkItemDomainError, WorkItemRef};
use crate::actor::domain::ActorId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum comment length in characters.
const MAX_COMMENT_CHARS: usize = 4000;

/// Validated comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentBody(String);

impl CommentBody {
    /// Validates and trims comment text.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::EmptyCommentBody`] or
    /// [`WorkItemDomainError::CommentTooLong`].
    pub fn new(raw: impl Into<String>) -> Result<Self, WorkItemDomainError> {
        let text = raw.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(WorkItemDomainError::EmptyCommentBody);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_COMMENT_CHARS {
            return Err(WorkItemDomainError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommentBody {
    type Error = WorkItemDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

/// A comment on a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    target: WorkItemRef,
    author: ActorId,
    body: CommentBody,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Work item the comment belongs to.
    pub target: WorkItemRef,
    /// Persisted author.
    pub author: ActorId,
    /// Persisted text.
    pub body: CommentBody,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment stamped with the current time.
    #[must_use]
    pub fn new(
        target: WorkItemRef,
        author: ActorId,
        body: CommentBody,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: CommentId::new(),
            target,
            author,
            body,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            target: data.target,
            author: data.author,
            body: data.body,
            created_at: data.created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the commented work item.
    #[must_use]
    pub const fn target(&self) -> WorkItemRef {
        self.target
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> ActorId {
        self.author
    }

    /// Returns the text.
    #[must_use]
    pub const fn body(&self) -> &CommentBody {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
