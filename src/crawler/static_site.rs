//! In-memory page fetcher
//!
//! Serves a fixed link graph without touching the network, so engine and
//! service tests crawl deterministically.

use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::url::normalize_url;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
struct StaticPage {
    text: String,
    links: Vec<String>,
}

/// A site held in memory
///
/// Unknown URLs answer with HTTP 404, URLs registered with
/// [`StaticSite::failing`] with HTTP 500. Every fetch is recorded under the
/// requested URL, redirects included.
#[derive(Debug, Default)]
pub struct StaticSite {
    pages: HashMap<String, StaticPage>,
    failing: HashSet<String>,
    redirects: HashMap<String, String>,
    delay: Option<Duration>,
    fetch_log: Mutex<Vec<String>>,
}

fn key(url: &str) -> String {
    normalize_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page with its text and outgoing links
    pub fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
        self.pages.insert(
            key(url),
            StaticPage {
                text: text.to_string(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    /// Makes every fetch of `url` fail
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(key(url));
        self
    }

    /// Answers fetches of `from` with the page at `to`, as a redirect would
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(key(from), key(to));
        self
    }

    /// Delays every response, to keep fetches in flight for a while
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetch_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times `url` was fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        let url = key(url);
        self.fetch_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|fetched| **fetched == url)
            .count()
    }
}

#[async_trait]
impl PageFetcher for StaticSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let url_key = url.to_string();
        self.fetch_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url_key.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&url_key) {
            return Err(FetchError::Http {
                url: url_key,
                status: 500,
            });
        }

        let landed = match self.redirects.get(&url_key) {
            Some(target) => Url::parse(target).map_err(|e| FetchError::Network {
                url: url_key.clone(),
                message: e.to_string(),
            })?,
            None => url.clone(),
        };

        match self.pages.get(landed.as_str()) {
            Some(page) => Ok(FetchedPage {
                url: landed,
                text: page.text.clone(),
                links: page.links.clone(),
            }),
            None => Err(FetchError::Http {
                url: url_key,
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages_and_logs() {
        let site = StaticSite::new().page("http://x.test", "hello", &["http://x.test/a"]);
        let page = site
            .fetch(&Url::parse("http://x.test/").unwrap())
            .await
            .unwrap();
        assert_eq!(page.text, "hello");
        assert_eq!(page.links, vec!["http://x.test/a"]);
        assert_eq!(site.fetch_count("http://x.test/"), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_failing() {
        let site = StaticSite::new()
            .page("http://x.test/", "", &[])
            .failing("http://x.test/");
        let root = Url::parse("http://x.test/").unwrap();
        let missing = Url::parse("http://x.test/missing").unwrap();

        assert!(matches!(
            site.fetch(&root).await,
            Err(FetchError::Http { status: 500, .. })
        ));
        assert!(matches!(
            site.fetch(&missing).await,
            Err(FetchError::Http { status: 404, .. })
        ));
        assert_eq!(site.fetched().len(), 2);
    }

    #[tokio::test]
    async fn test_redirect_lands_on_target() {
        let site = StaticSite::new()
            .page("http://x.test/new", "moved here", &[])
            .redirect("http://x.test/old", "http://x.test/new");

        let page = site
            .fetch(&Url::parse("http://x.test/old").unwrap())
            .await
            .unwrap();
        assert_eq!(page.url.as_str(), "http://x.test/new");
        assert_eq!(page.text, "moved here");
        assert_eq!(site.fetched(), vec!["http://x.test/old"]);
    }
}
