//! Error types for work-item domain validation and parsing.

use super::WorkItemKind;
use thiserror::Error;

/// Errors returned while constructing work-item domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkItemDomainError {
    /// The title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The title exceeds the maximum length.
    #[error("title is {actual} characters long, maximum is {max}")]
    TitleTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// The external identifier could not be parsed.
    #[error("invalid external identifier '{0}'")]
    InvalidExternalId(String),

    /// Sequence numbers start at 1.
    #[error("sequence numbers start at 1")]
    ZeroSequence,

    /// An external identifier of the wrong kind was supplied.
    #[error("expected a {expected} identifier, got a {actual} identifier")]
    KindMismatch {
        /// Kind the record requires.
        expected: WorkItemKind,
        /// Kind supplied.
        actual: WorkItemKind,
    },

    /// The comment body is empty after trimming.
    #[error("comment body must not be empty")]
    EmptyCommentBody,

    /// The comment body exceeds the maximum length.
    #[error("comment body is {actual} characters long, maximum is {max}")]
    CommentTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// The attachment file name is empty or contains path components.
    #[error("invalid attachment file name '{0}'")]
    InvalidFileName(String),

    /// The attachment content type is blank.
    #[error("attachment content type must not be empty")]
    EmptyContentType,
}

/// Error returned while parsing work-item statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown work item status: {0}")]
pub struct ParseStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
