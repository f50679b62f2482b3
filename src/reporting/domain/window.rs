//! Time window for completion counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The window's end does not follow its start.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("report window must end after it starts ({start} .. {end})")]
pub struct ReportWindowError {
    /// Requested start.
    pub start: DateTime<Utc>,
    /// Requested end.
    pub end: DateTime<Utc>,
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns [`ReportWindowError`] unless `start` is before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReportWindowError> {
        if start >= end {
            return Err(ReportWindowError { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` when `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
