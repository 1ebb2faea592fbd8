use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use talenthub_auth::AuthError;
use talenthub_job_queue::{delay_until, parse_schedule, EnqueueOptions, JobType};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnqueueBody {
    job_type: String,
    #[serde(default)]
    payload: Value,
    #[serde(flatten)]
    options: EnqueueOptions,
    /// RFC 3339 time to run at. Takes precedence over `delaySeconds`.
    scheduled_at: Option<String>,
}

/// POST /api/jobs
/// Hand a job to the queue provider on behalf of an internal caller.
pub async fn enqueue(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.api_token.check(authorization).map_err(|e| match e {
        AuthError::NotConfigured(_) => ApiError::forbidden("enqueue API is disabled"),
        other => {
            warn!("rejecting enqueue request with bad credentials");
            ApiError::from(other)
        }
    })?;

    let body: EnqueueBody = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    let job_type: JobType = body.job_type.parse()?;

    let options = match body.scheduled_at.as_deref() {
        Some(at) => body
            .options
            .delay(delay_until(parse_schedule(at)?, Utc::now())),
        None => body.options,
    };
    let result = state.queue.enqueue(job_type, body.payload, options).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "jobType": job_type,
            "messageId": result.message_id,
            "simulated": result.simulated,
        })),
    ))
}
