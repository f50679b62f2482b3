//! Human-readable sequential identifiers (`T0001`, `ST0007`).

use super::WorkItemDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of digits in a formatted sequence.
const SEQUENCE_WIDTH: usize = 4;

/// Work-item kind; each kind has its own prefix and independent sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    /// Top-level task, prefix `T`.
    Task,
    /// Subtask under a task, prefix `ST`.
    Subtask,
}

impl WorkItemKind {
    /// Returns the identifier prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Task => "T",
            Self::Subtask => "ST",
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Subtask => "subtask",
        }
    }
}

impl fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a work item in its kind's sequence, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// The first sequence number of every kind.
    pub const FIRST: Self = Self(1);

    /// Creates a sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::ZeroSequence`] for zero.
    pub const fn new(value: u64) -> Result<Self, WorkItemDomainError> {
        if value == 0 {
            return Err(WorkItemDomainError::ZeroSequence);
        }
        Ok(Self(value))
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the following sequence number, saturating at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u64> for SequenceNumber {
    type Error = WorkItemDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SequenceNumber> for u64 {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External identifier: kind prefix followed by a decimal sequence
/// zero-padded to four digits.
///
/// Sequences past 9999 simply grow wider (`T10000`); ordering and parsing
/// always go through the numeric sequence, never the string form.
///
/// # Examples
///
/// ```
/// use etms::work_item::domain::{ExternalId, WorkItemKind};
///
/// let next = ExternalId::next_after(WorkItemKind::Task, Some("T0042"));
/// assert_eq!(next.to_string(), "T0043");
///
/// let first = ExternalId::next_after(WorkItemKind::Subtask, None);
/// assert_eq!(first.to_string(), "ST0001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId {
    kind: WorkItemKind,
    sequence: SequenceNumber,
}

impl ExternalId {
    /// Creates an identifier from its parts.
    #[must_use]
    pub const fn new(kind: WorkItemKind, sequence: SequenceNumber) -> Self {
        Self { kind, sequence }
    }

    /// Parses an identifier that must belong to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidExternalId`] when the prefix does
    /// not match `kind` or the remainder is not a positive decimal integer.
    pub fn parse(kind: WorkItemKind, raw: &str) -> Result<Self, WorkItemDomainError> {
        let invalid = || WorkItemDomainError::InvalidExternalId(raw.to_owned());
        let digits = raw.trim().strip_prefix(kind.prefix()).ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let value = digits.parse::<u64>().map_err(|_| invalid())?;
        let sequence = SequenceNumber::new(value).map_err(|_| invalid())?;
        Ok(Self { kind, sequence })
    }

    /// Returns the identifier that follows the highest existing one.
    ///
    /// A missing or unparseable previous identifier counts as sequence 0, so
    /// the result is the first identifier of the kind.
    #[must_use]
    pub fn next_after(kind: WorkItemKind, previous: Option<&str>) -> Self {
        let sequence = previous
            .and_then(|raw| Self::parse(kind, raw).ok())
            .map_or(SequenceNumber::FIRST, |id| id.sequence.next());
        Self { kind, sequence }
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(self) -> WorkItemKind {
        self.kind
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn sequence(self) -> SequenceNumber {
        self.sequence
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.kind.prefix(),
            self.sequence.value(),
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for ExternalId {
    type Err = WorkItemDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = if value.trim_start().starts_with(WorkItemKind::Subtask.prefix()) {
            WorkItemKind::Subtask
        } else {
            WorkItemKind::Task
        };
        Self::parse(kind, value)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = WorkItemDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.to_string()
    }
}
