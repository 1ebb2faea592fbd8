//! Report generation job implementation.

use serde_json::{json, Value};
use talenthub_job_queue::{async_trait, JobExecutor, JobQueueError, JobType};
use tracing::{info, warn};

use crate::{placeholder_result, str_field};

/// Executor for generateReport jobs.
#[derive(Debug, Default)]
pub struct GenerateReportExecutor {}

impl GenerateReportExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobExecutor for GenerateReportExecutor {
    fn job_type(&self) -> JobType {
        JobType::GenerateReport
    }

    async fn execute(&self, payload: Value) -> Result<Value, JobQueueError> {
        let report_type = str_field(&payload, "reportType").unwrap_or("summary");
        let requested_by = str_field(&payload, "requestedBy");

        info!(
            report_type,
            requested_by = ?requested_by,
            "executing generateReport job"
        );
        warn!("generateReport job is a stub - no report rendered");

        Ok(placeholder_result(
            JobType::GenerateReport,
            "report generation is not implemented",
            json!({ "reportType": report_type, "reportUrl": Value::Null }),
        ))
    }
}
