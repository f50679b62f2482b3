//! Internal record identifiers for the work-item domain.
//!
//! These are database keys, distinct from the human-readable
//! [`ExternalId`](super::ExternalId) shown to users.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for a subtask record.
    SubtaskId
);

uuid_identifier!(
    /// Unique identifier for a comment.
    CommentId
);

uuid_identifier!(
    /// Unique identifier for an attachment.
    AttachmentId
);

/// Reference to either kind of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum WorkItemRef {
    /// A task.
    Task(TaskId),
    /// A subtask.
    Subtask(SubtaskId),
}

impl fmt::Display for WorkItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task:{id}"),
            Self::Subtask(id) => write!(f, "subtask:{id}"),
        }
    }
}

impl From<TaskId> for WorkItemRef {
    fn from(value: TaskId) -> Self {
        Self::Task(value)
    }
}

impl From<SubtaskId> for WorkItemRef {
    fn from(value: SubtaskId) -> Self {
        Self::Subtask(value)
    }
}
