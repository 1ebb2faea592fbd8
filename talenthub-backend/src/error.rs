use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use talenthub_auth::AuthError;
use talenthub_job_queue::JobQueueError;
use thiserror::Error;

/// Top-level API error shared by the enqueue and probe handlers.
///
/// The dispatch endpoint speaks a different body shape and uses
/// [`DispatchError`](crate::handlers::job_runner::DispatchError) instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication error: {0}")]
    Authentication(#[from] AuthError),
    #[error("job queue error: {0}")]
    JobQueue(#[from] JobQueueError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(AuthError::NotConfigured(_)) => StatusCode::FORBIDDEN,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::JobQueue(JobQueueError::UnknownJobType(_))
            | ApiError::JobQueue(JobQueueError::InvalidSchedule(_)) => StatusCode::BAD_REQUEST,
            ApiError::JobQueue(e) if e.is_configuration() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::JobQueue(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = match &self {
            ApiError::JobQueue(e) => json!({
                "error": self.to_string(),
                "retryable": e.is_retryable(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(payload)).into_response()
    }
}
