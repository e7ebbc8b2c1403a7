//! Job module: keyword searches and the registry that owns them
//!
//! # Components
//!
//! - `Keyword`: a validated, case-folded search term
//! - `CrawlJob`: one search with its status and match set
//! - `JobSnapshot`: a consistent, owned copy of a job's observable state
//! - `JobRegistry`: maps job ids to jobs for the lifetime of the process

mod crawl_job;
mod keyword;
mod registry;

pub use crawl_job::{CrawlJob, JobSnapshot};
pub use keyword::{Keyword, MAX_KEYWORD_LEN, MIN_KEYWORD_LEN};
pub use registry::{JobRegistry, JOB_ID_LEN};
