//! HTTP surface for the metrics pipeline
//!
//! - `GET /` liveness check
//! - `GET /metrics?domain=<string>` metrics report

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use seoscope_core::{MetricsError, MetricsReport, Resolver};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error, info, instrument, warn};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

#[derive(Debug)]
pub enum ApiError {
    MissingDomain,
    Internal,
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::MissingDomain => ApiError::MissingDomain,
            MetricsError::Score(_) | MetricsError::Store(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::MissingDomain => (StatusCode::BAD_REQUEST, "domain is required"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch metrics"),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(allowed_origin))
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid allowed origin: {}", e);
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

/// GET /
pub async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "seoscope metrics API",
    })
}

/// GET /metrics?domain=example.com
#[instrument(skip(state, query), fields(request_id))]
pub async fn metrics_handler(
    State(state): State<AppState>,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> ApiResult<MetricsReport> {
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", request_id.as_str());

    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected unreadable query string: {}", rejection.body_text());
        ApiError::MissingDomain
    })?;

    let domain = query.domain.unwrap_or_default();
    info!("Metrics requested for '{}'", domain);

    match state.resolver.resolve(&domain).await {
        Ok(report) => Ok(Json(report)),
        Err(MetricsError::MissingDomain) => {
            warn!("Rejected metrics request without a domain");
            Err(ApiError::MissingDomain)
        }
        Err(e) => {
            error!("Metrics pipeline failed for '{}': {}", domain, e);
            Err(e.into())
        }
    }
}
