// Router tests driven through tower's oneshot, no sockets involved

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use seoscope::server::{AppState, build_router};
use seoscope_core::data::{Database, SqliteStore};
use seoscope_core::error::ScoreError;
use seoscope_core::resolve::Resolver;
use seoscope_core::scorer::AuthorityScorer;
use seoscope_probe::{LivenessProbe, ProbeReport};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

struct StubScorer {
    value: Option<f64>,
    calls: AtomicUsize,
}

#[async_trait]
impl AuthorityScorer for StubScorer {
    async fn score(&self, _domain: &str) -> Result<f64, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.ok_or(ScoreError::Upstream { status: 503 })
    }
}

struct StubProbe;

#[async_trait]
impl LivenessProbe for StubProbe {
    async fn probe(&self, domain: &str) -> ProbeReport {
        ProbeReport {
            domain: domain.to_string(),
            https: true,
            redirected: false,
            indexable: true,
            domain_age: Some("4y".to_string()),
        }
    }
}

fn app_with(value: Option<f64>) -> (axum::Router, Arc<StubScorer>) {
    let scorer = Arc::new(StubScorer {
        value,
        calls: AtomicUsize::new(0),
    });
    let store = SqliteStore::new(Database::in_memory().unwrap());
    let resolver = Resolver::new(Arc::new(store), scorer.clone(), Arc::new(StubProbe));
    let state = AppState {
        resolver: Arc::new(resolver),
    };
    (build_router(state, None), scorer)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_root_reports_ok() {
    let (app, _) = app_with(Some(5.0));
    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_metrics_without_domain_is_rejected() {
    let (app, scorer) = app_with(Some(5.0));
    let (status, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "domain is required" }));
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_metrics_with_blank_domain_is_rejected() {
    let (app, scorer) = app_with(Some(5.0));
    let (status, body) = get(app, "/metrics?domain=%20%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "domain is required");
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_domain_parameter_gets_json_error() {
    let (app, scorer) = app_with(Some(5.0));
    let (status, body) = get(app, "/metrics?domain=a.com&domain=b.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "domain is required" }));
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_metrics_success_shape() {
    let (app, _) = app_with(Some(5.0));
    let (status, body) = get(app, "/metrics?domain=https://www.Example.com/path").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["authority_score"], 50);
    assert_eq!(body["traffic_bucket"], "high");
    assert_eq!(body["keywords_bucket"], "2k–10k");
    assert_eq!(body["value_bucket"], "low");
    assert_eq!(body["domain_age"], "4y");
    assert_eq!(body["indexable"], true);
    assert_eq!(body["risk"], "low");
    assert!(body.get("synthetic").is_none());
}

#[tokio::test]
async fn test_scorer_failure_is_internal_error() {
    let (app, scorer) = app_with(None);
    let (status, body) = get(app, "/metrics?domain=example.com").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Failed to fetch metrics" }));
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = app_with(Some(5.0));
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let scorer = Arc::new(StubScorer {
        value: Some(5.0),
        calls: AtomicUsize::new(0),
    });
    let store = SqliteStore::new(Database::in_memory().unwrap());
    let resolver = Resolver::new(Arc::new(store), scorer, Arc::new(StubProbe));
    let app = build_router(
        AppState {
            resolver: Arc::new(resolver),
        },
        Some("https://dashboard.example.com"),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://dashboard.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://dashboard.example.com"
    );
}
