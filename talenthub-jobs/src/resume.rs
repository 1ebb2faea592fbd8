//! Resume analysis job implementation.

use serde_json::{json, Value};
use talenthub_job_queue::{async_trait, JobExecutor, JobQueueError, JobType};
use tracing::{info, warn};

use crate::{placeholder_result, str_field};

/// Executor for analyzeResume jobs.
///
/// The real analysis would call an LLM and compute a match score against the
/// job opening. Until then the result carries no score.
#[derive(Debug, Default)]
pub struct AnalyzeResumeExecutor {}

impl AnalyzeResumeExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobExecutor for AnalyzeResumeExecutor {
    fn job_type(&self) -> JobType {
        JobType::AnalyzeResume
    }

    async fn execute(&self, payload: Value) -> Result<Value, JobQueueError> {
        let candidate_id = str_field(&payload, "candidateId");
        let job_id = str_field(&payload, "jobId");

        info!(
            candidate_id = ?candidate_id,
            job_id = ?job_id,
            "executing analyzeResume job"
        );
        warn!("analyzeResume job is a stub - no analysis performed");

        Ok(placeholder_result(
            JobType::AnalyzeResume,
            "resume analysis is not implemented",
            json!({
                "candidateId": candidate_id,
                "jobId": job_id,
                "matchScore": Value::Null,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_resume_executor() {
        let executor = AnalyzeResumeExecutor::new();
        assert_eq!(executor.job_type(), JobType::AnalyzeResume);

        let result = executor
            .execute(json!({"candidateId": "cand_7", "jobId": "job_3"}))
            .await
            .unwrap();
        assert_eq!(result["candidateId"], "cand_7");
        assert_eq!(result["jobId"], "job_3");
        assert!(result["matchScore"].is_null());
        assert_eq!(result["detail"], "resume analysis is not implemented");
    }
}
