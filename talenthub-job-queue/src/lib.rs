//! Job queue abstraction used by the talenthub backend.
//!
//! Jobs are not queued locally. [`QueueClient`] publishes a job descriptor to
//! an HTTP queue provider, which later POSTs it back to the backend's
//! dispatch endpoint, where the [`JobRunner`] executes it.
//!
//! # Architecture
//!
//! - [`QueueClient`] - Publishes jobs, optionally delayed or deduplicated
//! - [`JobRunner`] - Dispatch table from [`JobType`] to [`JobExecutor`]
//! - [`JobExecutor`] - Trait for implementing job handlers
//! - [`DeliveryLog`] - Recently processed provider message IDs
//! - [`JobRequest`] - The job descriptor on the wire
//!
//! # Example
//!
//! ```rust,no_run
//! use talenthub_config::{Environment, QueueConfig};
//! use talenthub_job_queue::{EnqueueOptions, JobType, QueueClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), talenthub_job_queue::JobQueueError> {
//!     let cfg = QueueConfig {
//!         token: Some("qstash-token".into()),
//!         callback_base_url: Some("https://crm.example.com".into()),
//!         ..QueueConfig::default()
//!     };
//!     let client = QueueClient::from_config(&cfg, Environment::Production)?;
//!
//!     let options = EnqueueOptions::default().deduplication_id("welcome-42");
//!     let result = client
//!         .enqueue(JobType::ProcessEmail, json!({"to": "a@b.com"}), options)
//!         .await?;
//!     println!("enqueued message {}", result.message_id);
//!     Ok(())
//! }
//! ```

mod client;
mod deliveries;
mod error;
mod executor;
mod runner;
mod types;

pub use client::{
    build_callback_url, delay_until, parse_schedule, QueueClient, DEDUPLICATION_HEADER,
    DELAY_HEADER,
};
pub use deliveries::DeliveryLog;
pub use error::JobQueueError;
pub use executor::JobExecutor;
pub use runner::{JobRunner, JobRunnerBuilder};
pub use types::{EnqueueOptions, EnqueueResult, JobRequest, JobType};

// Re-export async_trait for convenience when implementing JobExecutor
pub use async_trait::async_trait;
