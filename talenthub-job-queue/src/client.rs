//! Client publishing jobs to the external queue provider.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use talenthub_config::{Environment, QueueConfig};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::JobQueueError;
use crate::types::{EnqueueOptions, EnqueueResult, JobRequest, JobType};

pub const DELAY_HEADER: &str = "X-Delay";
pub const DEDUPLICATION_HEADER: &str = "X-Deduplication-Id";

#[derive(Debug, Deserialize)]
struct PublishResponse {
    #[serde(rename = "messageId")]
    message_id: String,
}

/// Hands jobs to the queue provider for asynchronous delivery to the runner.
#[derive(Clone)]
pub struct QueueClient {
    http: Client,
    token: Option<String>,
    publish_url: Url,
    callback_url: Option<String>,
    environment: Environment,
}

impl fmt::Debug for QueueClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueClient")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("publish_url", &self.publish_url.as_str())
            .field("callback_url", &self.callback_url)
            .field("environment", &self.environment)
            .finish()
    }
}

impl QueueClient {
    pub fn from_config(cfg: &QueueConfig, environment: Environment) -> Result<Self, JobQueueError> {
        let publish_url = Url::parse(&cfg.publish_url)
            .map_err(|e| JobQueueError::InvalidUrl(format!("{}: {}", cfg.publish_url, e)))?;

        let http = Client::builder()
            .user_agent(concat!("talenthub/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| JobQueueError::Network(e.to_string()))?;

        let callback_url = cfg
            .callback_base_url
            .as_deref()
            .map(|base| build_callback_url(base, &cfg.callback_path));

        Ok(Self {
            http,
            token: cfg.token.clone(),
            publish_url,
            callback_url,
            environment,
        })
    }

    /// URL the provider will POST the job back to.
    #[inline]
    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    /// True when real publishing is possible.
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.callback_url.is_some()
    }

    /// True when enqueue calls can succeed, simulated or real.
    #[inline]
    pub fn can_enqueue(&self) -> bool {
        self.is_configured() || (self.token.is_none() && self.environment.is_development())
    }

    /// Publish a job. No retry is attempted; see [`JobQueueError::is_retryable`].
    pub async fn enqueue(
        &self,
        job_type: JobType,
        payload: Value,
        options: EnqueueOptions,
    ) -> Result<EnqueueResult, JobQueueError> {
        let Some(token) = self.token.as_deref() else {
            if self.environment.is_development() {
                let message_id = format!("sim-{}", Uuid::new_v4());
                info!(
                    job_type = %job_type,
                    message_id = %message_id,
                    delay_seconds = ?options.delay_seconds,
                    "queue token not configured; simulating enqueue in development mode"
                );
                return Ok(EnqueueResult {
                    message_id,
                    simulated: true,
                });
            }
            error!(job_type = %job_type, "queue token not configured; refusing to enqueue");
            return Err(JobQueueError::NotConfigured("queue token"));
        };

        let callback_url = self
            .callback_url
            .as_deref()
            .ok_or(JobQueueError::NotConfigured("callback base url"))?;

        let mut url = self.publish_url.clone();
        url.query_pairs_mut().append_pair("url", callback_url);

        let mut request = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&JobRequest::new(job_type, payload));
        if let Some(delay) = options.delay_seconds {
            request = request.header(DELAY_HEADER, delay.to_string());
        }
        if let Some(id) = options.deduplication_id.as_deref() {
            request = request.header(DEDUPLICATION_HEADER, id);
        }

        debug!(job_type = %job_type, callback_url, "publishing job to queue provider");

        let response = request.send().await.map_err(|e| {
            warn!(job_type = %job_type, error = %e, "failed to reach queue provider");
            if e.is_timeout() {
                JobQueueError::Timeout
            } else {
                JobQueueError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(job_type = %job_type, %status, body = %body, "queue provider rejected job");
            return Err(JobQueueError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let published: PublishResponse = response.json().await.map_err(|e| {
            warn!(job_type = %job_type, error = %e, "failed to parse publish response");
            JobQueueError::ParseError(e.to_string())
        })?;

        info!(
            job_type = %job_type,
            message_id = %published.message_id,
            delay_seconds = ?options.delay_seconds,
            "job enqueued"
        );

        Ok(EnqueueResult {
            message_id: published.message_id,
            simulated: false,
        })
    }

    /// Publish a job to run at `scheduled_at`; past times run immediately.
    pub async fn schedule(
        &self,
        job_type: JobType,
        payload: Value,
        scheduled_at: DateTime<Utc>,
    ) -> Result<EnqueueResult, JobQueueError> {
        let delay = delay_until(scheduled_at, Utc::now());
        self.enqueue(job_type, payload, EnqueueOptions::default().delay(delay))
            .await
    }

    /// [`schedule`](Self::schedule) with an RFC 3339 timestamp.
    pub async fn schedule_rfc3339(
        &self,
        job_type: JobType,
        payload: Value,
        scheduled_at: &str,
    ) -> Result<EnqueueResult, JobQueueError> {
        let scheduled_at = parse_schedule(scheduled_at)?;
        self.schedule(job_type, payload, scheduled_at).await
    }
}

/// Whole seconds from `now` until `scheduled_at`, rounded, clamped at zero.
pub fn delay_until(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (scheduled_at - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    ((millis + 500) / 1000) as u64
}

pub fn parse_schedule(raw: &str) -> Result<DateTime<Utc>, JobQueueError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JobQueueError::InvalidSchedule(format!("{raw}: {e}")))
}

pub fn build_callback_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
