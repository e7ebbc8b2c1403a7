use crate::job::{CrawlJob, JobSnapshot, Keyword};
use crate::SiftError;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Length of generated job ids
pub const JOB_ID_LEN: usize = 8;

type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Maps job ids to jobs for the lifetime of the registry
///
/// Entries are never removed. Lookups and inserts may run concurrently from
/// any number of request handlers and crawl tasks.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Arc<CrawlJob>>>,
    generate_id: IdGenerator,
}

impl JobRegistry {
    /// Creates an empty registry issuing 8-character alphanumeric ids
    pub fn new() -> Self {
        Self::with_id_generator(random_job_id)
    }

    /// Creates an empty registry with a custom id source
    ///
    /// Collisions with existing ids are detected and a fresh id is drawn.
    pub fn with_id_generator<F>(generate_id: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            jobs: RwLock::new(HashMap::new()),
            generate_id: Box::new(generate_id),
        }
    }

    /// Validates the keyword and registers a new active job
    ///
    /// No crawling happens here; the caller hands the returned job to the
    /// engine.
    ///
    /// # Errors
    ///
    /// * `SiftError::InvalidKeyword` - keyword length outside 4..=32 after trimming
    pub fn create(&self, keyword: &str) -> Result<Arc<CrawlJob>, SiftError> {
        let keyword = Keyword::parse(keyword)?;

        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        loop {
            let id = (self.generate_id)();
            if jobs.contains_key(&id) {
                let collision = SiftError::IdCollision { id };
                tracing::debug!("{}, drawing another id", collision);
                continue;
            }

            let job = Arc::new(CrawlJob::new(id.clone(), keyword));
            jobs.insert(id, Arc::clone(&job));
            return Ok(job);
        }
    }

    /// Returns a snapshot of the job with the given id
    ///
    /// # Errors
    ///
    /// * `SiftError::JobNotFound` - no job was ever registered under `id`
    pub fn get(&self, id: &str) -> Result<JobSnapshot, SiftError> {
        self.job(id)
            .map(|job| job.snapshot())
            .ok_or_else(|| SiftError::JobNotFound { id: id.to_string() })
    }

    /// Returns a handle to the live job
    pub fn job(&self, id: &str) -> Option<Arc<CrawlJob>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws an id from the hex digits of a v4 UUID
fn random_job_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(JOB_ID_LEN);
    id
}
