//! HTTP gateway: POST /api/fact-check → verdict JSON.
//!
//! Errors map to statuses by kind: 400 input, 500 configuration, upstream
//! statuses echoed (429 for rate limits), 502 when the upstream never answered.
//! Error bodies are `{"error": "<message>"}`.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use factcheck_types::{FactCheckError, FactCheckVerdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::cache::CacheStatsSnapshot;
use crate::checker::FactChecker;
use crate::extractor::ImageInput;
use crate::stats::CheckStatsSnapshot;

/// Request body for POST /api/fact-check.
#[derive(Debug, Deserialize)]
pub struct FactCheckRequest {
    #[serde(default)]
    pub text: String,
}

/// Request body for POST /api/fact-check/image.
#[derive(Debug, Deserialize)]
pub struct ImageCheckRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CacheQuery {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CachedVerdictResponse {
    pub cached: Option<FactCheckVerdict>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Shared state for the HTTP server: checker + optional concurrency limit.
#[derive(Clone)]
pub struct GatewayState {
    pub checker: Arc<FactChecker>,
    /// When Some, limits concurrent fact-checks; excess requests wait for a slot.
    pub concurrency_semaphore: Option<Arc<Semaphore>>,
    pub max_concurrent_checks: Option<usize>,
}

/// Response body for gateway health endpoint.
#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub request_timeout_ms: u64,
    pub in_flight_checks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_checks: Option<usize>,
    pub image_extraction: bool,
    pub cache: CacheStatsSnapshot,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// HTTP status for a pipeline error.
pub fn error_status(error: &FactCheckError) -> StatusCode {
    match error {
        FactCheckError::Input(_) => StatusCode::BAD_REQUEST,
        FactCheckError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        FactCheckError::Upstream {
            status: Some(code), ..
        } => StatusCode::from_u16(*code)
            .ok()
            .filter(|status| status.is_client_error() || status.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        FactCheckError::Upstream { status: None, .. } => StatusCode::BAD_GATEWAY,
    }
}

fn into_api_error(error: &FactCheckError) -> ApiError {
    api_error(error_status(error), error.user_message())
}

async fn acquire_slot(
    state: &GatewayState,
) -> Result<Option<tokio::sync::SemaphorePermit<'_>>, ApiError> {
    let Some(sem) = state.concurrency_semaphore.as_ref() else {
        return Ok(None);
    };
    sem.acquire().await.map(Some).map_err(|_| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "concurrency limit closed",
        )
    })
}

async fn handle_fact_check(
    State(state): State<GatewayState>,
    Json(body): Json<FactCheckRequest>,
) -> Result<Json<FactCheckVerdict>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No text provided"));
    }
    let _permit = acquire_slot(&state).await?;
    state
        .checker
        .check(&body.text)
        .await
        .map(Json)
        .map_err(|error| into_api_error(&error))
}

async fn handle_image_check(
    State(state): State<GatewayState>,
    Json(body): Json<ImageCheckRequest>,
) -> Result<Json<FactCheckVerdict>, ApiError> {
    if !state.checker.has_extractor() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "text extraction is not configured",
        ));
    }
    let image_url = body.image_url.trim();
    if image_url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No image_url provided"));
    }
    let _permit = acquire_slot(&state).await?;
    let image = ImageInput::Url {
        url: image_url.to_string(),
        language: body.language,
    };
    state
        .checker
        .check_image(&image)
        .await
        .map(Json)
        .map_err(|error| into_api_error(&error))
}

async fn handle_cached(
    State(state): State<GatewayState>,
    Query(query): Query<CacheQuery>,
) -> Json<CachedVerdictResponse> {
    Json(CachedVerdictResponse {
        cached: state.checker.cached(&query.text),
    })
}

async fn handle_clear_cache(State(state): State<GatewayState>) -> Json<CacheClearedResponse> {
    state.checker.clear_cache();
    Json(CacheClearedResponse {
        success: true,
        message: "Cache cleared",
    })
}

async fn handle_stats(State(state): State<GatewayState>) -> Json<CheckStatsSnapshot> {
    Json(state.checker.stats())
}

async fn handle_health(State(state): State<GatewayState>) -> Json<GatewayHealthResponse> {
    Json(GatewayHealthResponse {
        status: "healthy",
        request_timeout_ms: u64::try_from(state.checker.request_timeout().as_millis())
            .unwrap_or(u64::MAX),
        in_flight_checks: state.checker.in_flight_count(),
        max_concurrent_checks: state.max_concurrent_checks,
        image_extraction: state.checker.has_extractor(),
        cache: state.checker.cache_stats(),
    })
}

/// Build the gateway router.
pub fn router(checker: Arc<FactChecker>, max_concurrent_checks: Option<usize>) -> Router {
    let concurrency_semaphore = max_concurrent_checks.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let state = GatewayState {
        checker,
        concurrency_semaphore,
        max_concurrent_checks,
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/fact-check", post(handle_fact_check))
        .route("/api/fact-check/image", post(handle_image_check))
        .route("/api/cache", get(handle_cached).delete(handle_clear_cache))
        .route("/api/stats", get(handle_stats))
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:3000`).
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix); in-flight requests complete before exit.
pub async fn run_http(
    checker: Arc<FactChecker>,
    bind_addr: &str,
    max_concurrent_checks: Option<usize>,
) -> Result<()> {
    let app = router(checker, max_concurrent_checks);
    let listener = TcpListener::bind(bind_addr).await?;
    let max_str = max_concurrent_checks.map_or_else(|| "unlimited".to_string(), |n| n.to_string());
    tracing::info!(
        event = "factcheck.gateway.listening",
        bind = bind_addr,
        max_concurrent = %max_str,
        "gateway listening (Ctrl+C/SIGTERM to stop)"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(event = "factcheck.gateway.stopped", "gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM; Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
