//! State module for tracking job progress
//!
//! # Components
//!
//! - `JobStatus`: lifecycle of a single crawl job (active, done, failed)

mod job_status;

pub use job_status::JobStatus;
