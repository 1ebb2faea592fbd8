//! Email job implementation.

use serde_json::{json, Value};
use talenthub_job_queue::{async_trait, JobExecutor, JobQueueError, JobType};
use tracing::{info, warn};

use crate::{placeholder_result, str_field};

/// Executor for processEmail jobs.
///
/// Expected payload: `{ "to": string, "subject"?: string, "template"?: string }`.
#[derive(Debug, Default)]
pub struct ProcessEmailExecutor {}

impl ProcessEmailExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobExecutor for ProcessEmailExecutor {
    fn job_type(&self) -> JobType {
        JobType::ProcessEmail
    }

    async fn execute(&self, payload: Value) -> Result<Value, JobQueueError> {
        let to = str_field(&payload, "to");
        let subject = str_field(&payload, "subject");

        info!(to = ?to, subject = ?subject, %payload, "executing processEmail job");
        warn!("processEmail job is a stub - no email sent");

        Ok(placeholder_result(
            JobType::ProcessEmail,
            "email delivery is not implemented",
            json!({ "to": to, "subject": subject }),
        ))
    }
}
