/// Job status definitions for tracking crawl progress
///
/// A job starts `Active` and moves exactly once to one of the terminal states.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Crawl is still running
    Active,

    /// Frontier drained with no fetch in flight
    Done,

    /// Seed could not be enqueued or fetched
    Failed,
}

impl JobStatus {
    /// Returns true if this is a terminal state (no further mutation allowed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Only `Active -> Done` and `Active -> Failed` are allowed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Done) | (Self::Active, Self::Failed)
        )
    }

    /// Wire representation used in API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
