//! Job executor trait for implementing job handlers.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::JobQueueError;
use crate::types::JobType;

/// Trait for implementing job executors.
///
/// Each [`JobType`] has exactly one executor registered with the
/// [`JobRunner`](crate::JobRunner).
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Returns the job type this executor handles.
    fn job_type(&self) -> JobType;

    /// Execute the job with the given payload and return its result.
    async fn execute(&self, payload: Value) -> Result<Value, JobQueueError>;
}
