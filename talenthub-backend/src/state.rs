use talenthub_auth::{ApiToken, SignatureVerifier};
use talenthub_config::{Config, Environment, DEFAULT_CALLBACK_PATH};
use talenthub_job_queue::{DeliveryLog, JobQueueError, JobRunner, QueueClient};

/// Shared application state passed to every route handler.
///
/// Everything inside is built once at startup and read-only afterwards, so
/// handlers share it through an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub verifier: SignatureVerifier,
    pub runner: JobRunner,
    pub queue: QueueClient,
    /// `None` when redelivery deduplication is disabled.
    pub deliveries: Option<DeliveryLog>,
    pub api_token: ApiToken,
    /// Route the queue provider delivers jobs to.
    pub callback_path: String,
}

impl AppState {
    /// Build a state container from its constituent parts.
    ///
    /// Deduplication starts disabled and the enqueue API starts without a
    /// token; see [`with_deliveries`](Self::with_deliveries) and
    /// [`with_api_token`](Self::with_api_token).
    pub fn new(verifier: SignatureVerifier, runner: JobRunner, queue: QueueClient) -> Self {
        Self {
            verifier,
            runner,
            queue,
            deliveries: None,
            api_token: ApiToken::default(),
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
        }
    }

    /// Wire every component from loaded configuration.
    pub fn from_config(cfg: &Config, runner: JobRunner) -> Result<Self, JobQueueError> {
        let verifier = SignatureVerifier::from_config(&cfg.signing, cfg.environment);
        let queue = QueueClient::from_config(&cfg.queue, cfg.environment)?;

        Ok(Self::new(verifier, runner, queue)
            .with_deliveries(DeliveryLog::from_config(&cfg.dispatch))
            .with_api_token(ApiToken::from_config(&cfg.api))
            .with_callback_path(cfg.queue.callback_path.clone()))
    }

    pub fn with_deliveries(mut self, deliveries: Option<DeliveryLog>) -> Self {
        self.deliveries = deliveries;
        self
    }

    pub fn with_api_token(mut self, token: ApiToken) -> Self {
        self.api_token = token;
        self
    }

    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = path.into();
        self
    }

    #[inline]
    pub fn environment(&self) -> Environment {
        self.verifier.environment()
    }

    /// Reason the service cannot do its job yet, if any.
    pub fn not_ready_reason(&self) -> Option<String> {
        if let Err(e) = self.verifier.ensure_configured() {
            return Some(e.to_string());
        }
        if !self.queue.can_enqueue() {
            return Some("job queue is not configured".to_string());
        }
        None
    }
}
