//! URL handling module for Sumi-Sift
//!
//! This module provides URL normalization and origin scoping. Every URL that
//! enters a crawl frontier or a match set has passed through [`normalize_url`]
//! and been checked against the job's [`SiteOrigin`].

mod normalize;
mod origin;

pub use normalize::normalize_url;
pub use origin::SiteOrigin;
