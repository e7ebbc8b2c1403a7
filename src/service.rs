//! Search service - the entry point the HTTP API talks to
//!
//! Couples a [`JobRegistry`] with a [`CrawlEngine`]: submitting registers the
//! job synchronously and leaves the crawl running in the background.

use crate::crawler::CrawlEngine;
use crate::job::{JobRegistry, JobSnapshot};
use crate::SiftError;
use std::sync::Arc;

#[derive(Clone)]
pub struct SearchService {
    registry: Arc<JobRegistry>,
    engine: Arc<CrawlEngine>,
}

impl SearchService {
    pub fn new(registry: Arc<JobRegistry>, engine: Arc<CrawlEngine>) -> Self {
        Self { registry, engine }
    }

    /// Registers a search and starts crawling for it
    ///
    /// Returns the job id as soon as the job exists; crawling continues on the
    /// tokio runtime this is called from.
    ///
    /// # Errors
    ///
    /// * `SiftError::InvalidKeyword` - nothing is registered or crawled
    pub fn submit(&self, keyword: &str) -> Result<String, SiftError> {
        let job = self.registry.create(keyword)?;
        let id = job.id().to_string();

        tracing::info!(job_id = %id, keyword = %job.keyword(), "Search submitted");
        // The handle is dropped; the job itself carries the outcome
        self.engine.start(job);

        Ok(id)
    }

    /// Current state of a search
    pub fn status(&self, id: &str) -> Result<JobSnapshot, SiftError> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }
}
