//! Crawler module for keyword searches
//!
//! This module contains the core crawling logic, including:
//! - The fetch port and its HTTP implementation
//! - HTML parsing into text and links
//! - The per-job frontier with deduplication and origin scoping
//! - The engine that drains a frontier with a bounded worker pool

mod engine;
mod fetcher;
mod frontier;
mod parser;
#[cfg(test)]
mod static_site;

pub use engine::{CrawlEngine, CrawlSummary, EngineSettings};
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{Frontier, Lease};
pub use parser::{parse_html, ParsedPage};
#[cfg(test)]
pub use static_site::StaticSite;
