//! Crawl engine - drives one job's frontier to quiescence
//!
//! For every job the engine:
//! 1. Seeds a fresh [`Frontier`] with the base URL
//! 2. Fetches the seed itself; a failure there fails the job
//! 3. Spawns a bounded pool of workers that drain the frontier
//! 4. Records matching pages and enqueues discovered links
//! 5. Marks the job done once the frontier is empty and nothing is in flight
//!
//! Fetches of individual pages may fail; those pages are skipped and the
//! crawl carries on.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::job::CrawlJob;
use crate::state::JobStatus;
use crate::url::SiteOrigin;
use crate::{FetchError, SiftError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::Instrument;
use url::Url;

/// Tuning knobs of the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Concurrent workers per job
    pub workers: usize,

    /// In-flight fetches allowed across all jobs
    pub max_total_fetches: usize,

    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,

    /// Longest an idle worker sleeps before re-checking the frontier
    pub idle_poll: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            workers: config.max_concurrent_fetches as usize,
            max_total_fetches: config.max_total_fetches as usize,
            fetch_timeout: config.fetch_timeout(),
            idle_poll: config.idle_poll(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Outcome of one crawl, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub status: JobStatus,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub matches: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct CrawlStats {
    pages_fetched: AtomicUsize,
    pages_failed: AtomicUsize,
}

/// Runs crawl jobs against one site
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    site: SiteOrigin,
    settings: EngineSettings,

    /// Shared by every job this engine runs
    fetch_permits: Arc<Semaphore>,
}

impl CrawlEngine {
    pub fn new(fetcher: Arc<dyn PageFetcher>, site: SiteOrigin, settings: EngineSettings) -> Self {
        let fetch_permits = Arc::new(Semaphore::new(settings.max_total_fetches.max(1)));
        Self {
            fetcher,
            site,
            settings,
            fetch_permits,
        }
    }

    /// Builds an engine for the configured base URL
    pub fn from_config(
        config: &CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, SiftError> {
        let site = SiteOrigin::parse(&config.base_url)?;
        Ok(Self::new(fetcher, site, EngineSettings::from_config(config)))
    }

    pub fn site(&self) -> &SiteOrigin {
        &self.site
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Starts crawling `job` in the background
    pub fn start(self: &Arc<Self>, job: Arc<CrawlJob>) -> JoinHandle<CrawlSummary> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run(job).await })
    }

    /// Crawls `job` to completion
    ///
    /// Always leaves the job in a terminal state.
    pub async fn run(self: Arc<Self>, job: Arc<CrawlJob>) -> CrawlSummary {
        let span = tracing::info_span!("crawl", job_id = %job.id());
        self.crawl(job).instrument(span).await
    }

    async fn crawl(self: Arc<Self>, job: Arc<CrawlJob>) -> CrawlSummary {
        let started = Instant::now();
        let stats = Arc::new(CrawlStats::default());
        let frontier = Arc::new(Frontier::new(self.site.clone()));
        let seed = self.site.seed().clone();

        tracing::info!(keyword = %job.keyword(), seed = %seed, "Starting crawl");

        if !frontier.try_enqueue(seed.as_str()) {
            tracing::error!(seed = %seed, "Seed URL rejected by frontier");
            Self::finish(&job, JobStatus::Failed);
            return Self::summarize(&job, &stats, started);
        }

        if let Err(e) = self.crawl_seed(&job, &frontier, &stats).await {
            tracing::warn!("{}", e);
            Self::finish(&job, JobStatus::Failed);
            return Self::summarize(&job, &stats, started);
        }

        let mut workers = JoinSet::new();
        for worker_id in 0..self.settings.workers.max(1) {
            let engine = Arc::clone(&self);
            let job = Arc::clone(&job);
            let frontier = Arc::clone(&frontier);
            let stats = Arc::clone(&stats);
            workers.spawn(
                async move { engine.worker(&job, &frontier, &stats).await }
                    .instrument(tracing::debug_span!("worker", worker_id)),
            );
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Crawl worker terminated abnormally: {}", e);
            }
        }

        Self::finish(&job, JobStatus::Done);
        let summary = Self::summarize(&job, &stats, started);
        tracing::info!(
            pages_fetched = summary.pages_fetched,
            pages_failed = summary.pages_failed,
            matches = summary.matches,
            visited = frontier.visited_count(),
            "Crawl completed in {:?}",
            summary.elapsed
        );
        summary
    }

    /// Fetches the seed page before any worker exists
    async fn crawl_seed(
        &self,
        job: &CrawlJob,
        frontier: &Frontier,
        stats: &CrawlStats,
    ) -> Result<(), SiftError> {
        let lease = frontier.take().ok_or_else(|| SiftError::SeedFetchFailure {
            url: self.site.seed().to_string(),
            reason: "seed missing from frontier".to_string(),
        })?;

        match self.fetch_page(lease.url()).await {
            Ok(page) => {
                stats.pages_fetched.fetch_add(1, Ordering::Relaxed);
                self.process_page(job, frontier, lease.url(), &page);
                Ok(())
            }
            Err(e) => Err(SiftError::SeedFetchFailure {
                url: lease.url().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Takes URLs until the frontier is quiescent
    async fn worker(&self, job: &CrawlJob, frontier: &Frontier, stats: &CrawlStats) {
        loop {
            if let Some(lease) = frontier.take() {
                match self.fetch_page(lease.url()).await {
                    Ok(page) => {
                        stats.pages_fetched.fetch_add(1, Ordering::Relaxed);
                        self.process_page(job, frontier, lease.url(), &page);
                    }
                    Err(e) => {
                        stats.pages_failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("Skipping page: {}", e);
                    }
                }
                // lease dropped here, after the page's links are enqueued
                continue;
            }

            if frontier.is_quiescent() {
                break;
            }

            frontier.wait_for_work(self.settings.idle_poll).await;
        }
    }

    /// Fetches one page under the global permit and the per-fetch timeout
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        // The semaphore is never closed
        let _permit = self.fetch_permits.acquire().await.ok();

        tracing::debug!(url = %url, "Fetching");
        let page = tokio::time::timeout(self.settings.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })??;

        if !self.site.contains(&page.url) {
            return Err(FetchError::OffSite {
                url: url.to_string(),
                final_url: page.url.to_string(),
            });
        }

        Ok(page)
    }

    /// Records a match and feeds the page's links to the frontier
    ///
    /// A redirected page counts under its landing URL; if another lease
    /// already owns that URL the page is dropped as a duplicate.
    fn process_page(
        &self,
        job: &CrawlJob,
        frontier: &Frontier,
        requested: &Url,
        page: &FetchedPage,
    ) {
        let Some(url) = frontier.claim_landing(requested, &page.url) else {
            tracing::debug!(
                url = %requested,
                landed = %page.url,
                "Redirect target already known, skipping"
            );
            return;
        };

        if job.keyword().is_found_in(&page.text) && job.add_match(&url) {
            tracing::info!(url = %url, "Keyword found");
        }

        let accepted = page
            .links
            .iter()
            .filter(|link| frontier.try_enqueue(link))
            .count();

        tracing::debug!(
            url = %url,
            links = page.links.len(),
            accepted,
            "Processed page"
        );
    }

    fn finish(job: &CrawlJob, status: JobStatus) {
        let result = match status {
            JobStatus::Failed => job.fail(),
            _ => job.complete(),
        };
        if let Err(e) = result {
            tracing::error!("Could not finish job: {}", e);
        }
    }

    fn summarize(job: &CrawlJob, stats: &CrawlStats, started: Instant) -> CrawlSummary {
        CrawlSummary {
            status: job.status(),
            pages_fetched: stats.pages_fetched.load(Ordering::Relaxed),
            pages_failed: stats.pages_failed.load(Ordering::Relaxed),
            matches: job.match_count(),
            elapsed: started.elapsed(),
        }
    }
}
