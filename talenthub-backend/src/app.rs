use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{job_runner, jobs};
use crate::state::AppState;

// Job payloads are small JSON documents.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Build the primary axum router with the provided shared application state.
///
/// The dispatch route is mounted at `state.callback_path` so it always
/// matches the URL handed to the queue provider.
pub fn build_router(state: Arc<AppState>) -> Router {
    let dispatch = post(job_runner::dispatch).fallback(job_runner::method_not_allowed);

    Router::new()
        .route(&state.callback_path, dispatch)
        .route("/api/jobs", post(jobs::enqueue::enqueue))
        .route("/api/health", get(health_handler))
        .route("/api/ready", get(ready_handler))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always return 200 OK when process is alive.
    (StatusCode::OK, "OK")
}

async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.not_ready_reason() {
        None => (StatusCode::OK, "OK".to_string()),
        Some(reason) => {
            tracing::warn!(%reason, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, reason)
        }
    }
}
