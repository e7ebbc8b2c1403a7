use crate::job::Keyword;
use crate::state::JobStatus;
use crate::SiftError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use url::Url;

/// Mutable part of a job, always read and written under one lock
#[derive(Debug)]
struct JobState {
    status: JobStatus,
    matches: BTreeSet<String>,
    finished_at: Option<DateTime<Utc>>,
}

/// One keyword search
///
/// Identity and keyword are fixed at creation. Status and matches are only
/// mutated by the crawl engine; readers take [`JobSnapshot`]s, which are cloned
/// under the lock and therefore never observe a half-applied update.
#[derive(Debug)]
pub struct CrawlJob {
    id: String,
    keyword: Keyword,
    created_at: DateTime<Utc>,
    state: RwLock<JobState>,
}

/// Point-in-time copy of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub id: String,
    pub keyword: String,
    pub status: JobStatus,
    /// Matching URLs in lexicographic order
    pub urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    /// Creates an active job with an empty match set
    pub fn new(id: String, keyword: Keyword) -> Self {
        Self {
            id,
            keyword,
            created_at: Utc::now(),
            state: RwLock::new(JobState {
                status: JobStatus::Active,
                matches: BTreeSet::new(),
                finished_at: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    pub fn status(&self) -> JobStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    pub fn match_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches
            .len()
    }

    /// Records a matching page
    ///
    /// Returns true if the URL was not already recorded. Matches arriving after
    /// the job reached a terminal state are ignored.
    pub fn add_match(&self, url: &Url) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.status.is_terminal() {
            return false;
        }
        state.matches.insert(url.to_string())
    }

    /// Marks the crawl as finished
    pub fn complete(&self) -> Result<(), SiftError> {
        self.transition(JobStatus::Done)
    }

    /// Marks the crawl as failed
    ///
    /// A failed job never exposes matches, even if some were recorded before
    /// the failure was detected.
    pub fn fail(&self) -> Result<(), SiftError> {
        self.transition(JobStatus::Failed)
    }

    fn transition(&self, next: JobStatus) -> Result<(), SiftError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if !state.status.can_transition_to(next) {
            return Err(SiftError::InvalidTransition {
                from: state.status,
                to: next,
            });
        }

        state.status = next;
        state.finished_at = Some(Utc::now());
        if next == JobStatus::Failed {
            state.matches.clear();
        }

        Ok(())
    }

    /// Takes a consistent copy of the job's observable state
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        JobSnapshot {
            id: self.id.clone(),
            keyword: self.keyword.to_string(),
            status: state.status,
            urls: state.matches.iter().cloned().collect(),
            created_at: self.created_at,
            finished_at: state.finished_at,
        }
    }
}
