//! Fetch port and its HTTP implementation
//!
//! The crawl engine only sees the [`PageFetcher`] trait: given an absolute URL
//! it gets back the page text and the absolute links on the page, or a
//! [`FetchError`] it can skip over. [`HttpFetcher`] is the production
//! implementation, built on reqwest and the HTML parser.

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// Visible page text
    pub text: String,

    /// Absolute hyperlink targets found on the page
    pub links: Vec<String>,
}

/// Source of page contents for the crawl engine
///
/// Implementations must report malformed or unreachable URLs as a
/// `FetchError`, never panic.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request, body included
///
/// # Example
///
/// ```no_run
/// use sumi_sift::config::UserAgentConfig;
/// use sumi_sift::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL and classifies the outcome
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with a text or HTML body | `FetchedPage` |
    /// | non-2xx status | `FetchError::Http` |
    /// | non-text Content-Type | `FetchError::ContentMismatch` |
    /// | timeout | `FetchError::Timeout` |
    /// | connect / DNS / TLS failure | `FetchError::Network` |
    /// | body read failure | `FetchError::Body` |
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let parsed = parse_html(&body, &final_url).map_err(|message| FetchError::Body {
            url: url.to_string(),
            message,
        })?;

        tracing::debug!(
            url = %final_url,
            title = parsed.title.as_deref().unwrap_or(""),
            links = parsed.links.len(),
            "Parsed page"
        );

        Ok(FetchedPage {
            url: final_url,
            text: parsed.text,
            links: parsed.links,
        })
    }
}

/// Returns true for Content-Type values worth scanning for text
///
/// A missing header is treated as HTML.
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime.starts_with("text/") || mime == "application/xhtml+xml"
}

fn classify_request_error(url: &Url, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
