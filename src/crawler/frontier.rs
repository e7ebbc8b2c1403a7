//! Per-job work queue with deduplication and origin scoping
//!
//! The frontier tracks three things under a single lock:
//! - `visited`: every URL ever accepted, so no page is fetched twice
//! - `pending`: accepted URLs not yet handed to a worker
//! - `in_flight`: URLs handed out whose [`Lease`] is still alive
//!
//! A job is finished once `pending` is empty and `in_flight` is zero.

use crate::url::{normalize_url, SiteOrigin};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    pending: VecDeque<Url>,
    in_flight: usize,
}

/// Deduplicating, origin-scoped work queue for one crawl job
#[derive(Debug)]
pub struct Frontier {
    site: SiteOrigin,
    state: Mutex<FrontierState>,

    /// Signalled whenever work is added or a lease is released
    activity: Notify,
}

/// A URL taken from the frontier
///
/// The URL counts as in flight until the lease is dropped, which keeps the
/// frontier from reporting quiescence while its page may still add links.
#[derive(Debug)]
pub struct Lease<'a> {
    frontier: &'a Frontier,
    url: Url,
}

impl Frontier {
    pub fn new(site: SiteOrigin) -> Self {
        Self {
            site,
            state: Mutex::new(FrontierState::default()),
            activity: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts a URL for crawling
    ///
    /// Returns false without touching any state when the URL does not
    /// normalize, lies outside the site, or was accepted before. The visited
    /// check and the insertion happen under one lock, so concurrent callers
    /// can never enqueue the same URL twice.
    pub fn try_enqueue(&self, url: &str) -> bool {
        let url = match normalize_url(url) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Rejecting {}: {}", url, e);
                return false;
            }
        };

        if !self.site.contains(&url) {
            tracing::trace!("Rejecting off-site URL {}", url);
            return false;
        }

        {
            let mut state = self.lock();
            if !state.visited.insert(url.to_string()) {
                return false;
            }
            state.pending.push_back(url);
        }

        self.activity.notify_waiters();
        true
    }

    /// Decides under which URL a fetched page counts
    ///
    /// `requested` is the leased URL, `landed` where redirects ended up. A
    /// page that stayed put counts under its own URL. A page that redirected
    /// counts under the landing URL, which is marked visited so it is never
    /// fetched again; if that URL was already known (or lies off-site) the
    /// page is a duplicate and `None` is returned.
    pub fn claim_landing(&self, requested: &Url, landed: &Url) -> Option<Url> {
        let landed = normalize_url(landed.as_str()).ok()?;
        if landed == *requested {
            return Some(landed);
        }

        if !self.site.contains(&landed) {
            return None;
        }

        let mut state = self.lock();
        state.visited.insert(landed.to_string()).then_some(landed)
    }

    /// Hands out the oldest pending URL, if any
    ///
    /// Order is breadth-first, which guarantees every accepted URL is
    /// eventually taken.
    pub fn take(&self) -> Option<Lease<'_>> {
        let mut state = self.lock();
        let url = state.pending.pop_front()?;
        state.in_flight += 1;
        Some(Lease {
            frontier: self,
            url,
        })
    }

    /// True when nothing is pending and no lease is outstanding
    pub fn is_quiescent(&self) -> bool {
        let state = self.lock();
        state.pending.is_empty() && state.in_flight == 0
    }

    /// Waits until work may be available or the frontier became quiescent
    ///
    /// Returns immediately if either is already the case, otherwise after the
    /// next enqueue or lease release, or after `max_wait` at the latest.
    pub async fn wait_for_work(&self, max_wait: Duration) {
        let notified = self.activity.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        {
            let state = self.lock();
            if !state.pending.is_empty() || state.in_flight == 0 {
                return;
            }
        }

        let _ = tokio::time::timeout(max_wait, notified).await;
    }

    /// Number of URLs ever accepted
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.activity.notify_waiters();
    }
}

impl Lease<'_> {
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.frontier.release();
    }
}
