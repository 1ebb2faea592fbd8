use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use talenthub_auth::{AuthError, SIGNATURE_HEADER};
use talenthub_job_queue::JobQueueError;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Provider-assigned delivery ID, stable across redeliveries of one message.
pub const MESSAGE_ID_HEADER: &str = "upstash-message-id";

/// Body delivered by the queue provider.
///
/// `jobType` stays a string here so an unregistered type reaches the runner
/// and is reported like any other job failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchRequest {
    job_type: String,
    #[serde(default)]
    payload: Value,
}

/// Failures of the dispatch endpoint.
///
/// Rejections carry `{"message"}` only; everything else is reported to the
/// provider as a failed job so it can retry.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error(transparent)]
    Configuration(#[from] AuthError),
    #[error("invalid job request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Job(#[from] JobQueueError),
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        match self {
            DispatchError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
            }
            other => {
                let error = other.to_string();
                let body = json!({
                    "success": false,
                    "message": format!("Error processing job: {error}"),
                    "error": error,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// POST /api/job-runner
/// Verify a provider delivery and run the named job.
pub async fn dispatch(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, DispatchError> {
    if state.environment().is_development() {
        debug!("development mode; skipping signature verification");
    } else {
        verify_delivery(&state, &headers, &body)?;
    }

    let request: DispatchRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "rejecting job delivery with malformed body");
        DispatchError::from(e)
    })?;

    let message_id = headers
        .get(MESSAGE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    if let (Some(deliveries), Some(id)) = (&state.deliveries, message_id) {
        if deliveries.contains(id).await {
            info!(message_id = id, job_type = %request.job_type, "skipping redelivered job");
            return Ok(Json(json!({
                "success": true,
                "message": "Job already processed",
                "result": Value::Null,
            })));
        }
    }

    info!(job_type = %request.job_type, message_id = ?message_id, "processing job");

    let result = state
        .runner
        .run(&request.job_type, request.payload)
        .await
        .map_err(|e| {
            error!(job_type = %request.job_type, error = %e, "job failed");
            DispatchError::from(e)
        })?;

    if let (Some(deliveries), Some(id)) = (&state.deliveries, message_id) {
        deliveries.record(id).await;
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Job {} completed successfully", request.job_type),
        "result": result,
    })))
}

fn verify_delivery(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), DispatchError> {
    state.verifier.ensure_configured().map_err(|e| {
        error!(error = %e, "cannot verify job delivery");
        DispatchError::from(e)
    })?;

    let Some(signature) = headers.get(SIGNATURE_HEADER) else {
        warn!("rejecting job delivery without signature");
        return Err(DispatchError::Unauthorized("Missing signature"));
    };

    // A header that is not visible ASCII cannot be a valid signature.
    let signature = signature.to_str().unwrap_or_default();
    if !state.verifier.verify(signature, body) {
        warn!("rejecting job delivery with invalid signature");
        return Err(DispatchError::Unauthorized("Invalid signature"));
    }
    Ok(())
}

/// Any other method on the dispatch route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(json!({ "message": "Method not allowed. Use POST." })),
    )
}
