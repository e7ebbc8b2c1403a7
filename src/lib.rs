//! Sumi-Sift: a keyword search crawler
//!
//! This crate accepts a keyword, crawls every page reachable from a configured
//! base origin, and records which of those pages contain the keyword. Jobs are
//! submitted and polled over a small JSON HTTP API.

pub mod api;
pub mod config;
pub mod crawler;
pub mod job;
pub mod service;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Keyword must be between 4 and 32 characters.")]
    InvalidKeyword,

    #[error("Search ID not found.")]
    JobNotFound { id: String },

    #[error("Seed fetch failed for {url}: {reason}")]
    SeedFetchFailure { url: String, reason: String },

    #[error("Job id collision on {id}")]
    IdCollision { id: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::JobStatus,
        to: state::JobStatus,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
}

/// Errors reported by a page fetcher
///
/// Every variant is recoverable: the engine skips the page (or fails the job
/// when it is the seed) and keeps going.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("{url} redirected off-site to {final_url}")]
    OffSite { url: String, final_url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, Frontier, HttpFetcher, PageFetcher};
pub use job::{CrawlJob, JobRegistry, JobSnapshot, Keyword};
pub use service::SearchService;
pub use state::JobStatus;
pub use crate::url::{normalize_url, SiteOrigin};
