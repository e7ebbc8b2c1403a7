//! Integration tests for the HTTP API
//!
//! Requests go through the axum router with `tower::ServiceExt::oneshot`;
//! the crawled site is a wiremock server.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use sumi_sift::config::Config;
use sumi_sift::crawler::{CrawlEngine, HttpFetcher};
use sumi_sift::job::JobRegistry;
use sumi_sift::service::SearchService;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: &MockServer) -> Router {
    let mut config = Config::with_base_url(server.uri());
    config.crawler.fetch_timeout_ms = 2_000;
    config.crawler.idle_poll_ms = 5;

    let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.fetch_timeout())
        .expect("Failed to build fetcher");
    let engine =
        CrawlEngine::from_config(&config.crawler, Arc::new(fetcher)).expect("Failed to build engine");
    let service = SearchService::new(Arc::new(JobRegistry::new()), Arc::new(engine));
    sumi_sift::api::router(service)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

/// Home page linking to `/a` (which mentions a widget) and to another site
async fn sample_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<p>home page</p><a href="/a">A</a><a href="http://other.test/page">Elsewhere</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<p>the widget page</p><a href="/">Home</a>"#))
        .mount(&server)
        .await;

    server
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router should not fail");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should be readable");
    let body = serde_json::from_slice(&bytes).expect("Body should be JSON");
    (status, body)
}

fn post_crawl(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/crawl")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn get_crawl(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/crawl/{}", id))
        .body(Body::empty())
        .expect("valid request")
}

async fn poll_until_done(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = send(app, get_crawl(id)).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "active" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Search {} never finished", id);
}

#[tokio::test]
async fn test_submit_and_poll() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, body) = send(&app, post_crawl(r#"{"keyword": "widget"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().expect("id should be a string").to_string();
    assert_eq!(id.len(), 8);

    let result = poll_until_done(&app, &id).await;
    assert_eq!(
        result,
        json!({
            "id": id,
            "status": "done",
            "urls": [format!("{}/a", server.uri())],
        })
    );
}

#[tokio::test]
async fn test_short_keyword_rejected() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, body) = send(&app, post_crawl(r#"{"keyword": "ab"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Keyword must be between 4 and 32 characters."})
    );

    let (_, health) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("valid request"),
    )
    .await;
    assert_eq!(health["jobs"], 0);
}

#[tokio::test]
async fn test_keyword_length_measured_after_trim() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, _) = send(&app, post_crawl(r#"{"keyword": "   abc    "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(33);
    let (status, _) = send(&app, post_crawl(&format!(r#"{{"keyword": "{}"}}"#, long))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_crawl(r#"{"keyword": "  four  "}"#)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_keyword_rejected() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, body) = send(&app, post_crawl("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Keyword must be between 4 and 32 characters.");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, body) = send(&app, post_crawl("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_id_not_found() {
    let server = sample_site().await;
    let app = app(&server);

    let (status, body) = send(&app, get_crawl("zzzzzzzz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Search ID not found."}));
}

#[tokio::test]
async fn test_failed_seed_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app(&server);

    let (_, body) = send(&app, post_crawl(r#"{"keyword": "widget"}"#)).await;
    let id = body["id"].as_str().expect("id").to_string();

    let result = poll_until_done(&app, &id).await;
    assert_eq!(result["status"], "failed");
    assert_eq!(result["urls"], json!([]));
}

#[tokio::test]
async fn test_terminal_result_is_stable() {
    let server = sample_site().await;
    let app = app(&server);

    let (_, body) = send(&app, post_crawl(r#"{"keyword": "page"}"#)).await;
    let id = body["id"].as_str().expect("id").to_string();

    let first = poll_until_done(&app, &id).await;
    let (_, second) = send(&app, get_crawl(&id)).await;
    assert_eq!(first, second);
    assert_eq!(
        first["urls"],
        json!([format!("{}/", server.uri()), format!("{}/a", server.uri())])
    );
}
