use crate::api::ApiError;
use crate::service::SearchService;
use crate::state::JobStatus;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of `POST /crawl`
///
/// A missing keyword is treated as empty and fails validation.
#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct CrawlCreated {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CrawlStatusResponse {
    pub id: String,
    pub status: JobStatus,
    pub urls: Vec<String>,
}

/// Starts a search
///
/// The body is parsed as JSON whatever the Content-Type header says.
pub async fn create_crawl(
    State(service): State<SearchService>,
    body: Bytes,
) -> Result<Json<CrawlCreated>, ApiError> {
    let request: CrawlRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    let id = service.submit(&request.keyword)?;
    Ok(Json(CrawlCreated { id }))
}

/// Reports status and matches of a search
pub async fn get_crawl(
    State(service): State<SearchService>,
    Path(id): Path<String>,
) -> Result<Json<CrawlStatusResponse>, ApiError> {
    let snapshot = service.status(&id)?;
    Ok(Json(CrawlStatusResponse {
        id: snapshot.id,
        status: snapshot.status,
        urls: snapshot.urls,
    }))
}

pub async fn health(State(service): State<SearchService>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "jobs": service.registry().len(),
    }))
}
