//! HTTP API for submitting and polling searches
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /crawl` | start a search, body `{"keyword": "..."}` |
//! | `GET /crawl/:id` | status and matches of a search |
//! | `GET /health` | liveness and job count |

mod error;
mod routes;

use crate::service::SearchService;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use routes::{CrawlCreated, CrawlRequest, CrawlStatusResponse};

/// Builds the application router around a search service
pub fn router(service: SearchService) -> Router {
    Router::new()
        .route("/crawl", post(routes::create_crawl))
        .route("/crawl/:id", get(routes::get_crawl))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
