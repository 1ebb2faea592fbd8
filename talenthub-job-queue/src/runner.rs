//! Dispatch table routing a job type to its executor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::error::JobQueueError;
use crate::executor::JobExecutor;
use crate::types::JobType;

/// Immutable map from [`JobType`] to executor, complete by construction.
#[derive(Clone)]
pub struct JobRunner {
    executors: Arc<HashMap<JobType, Arc<dyn JobExecutor>>>,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner")
            .field("job_types", &self.job_types())
            .finish()
    }
}

impl JobRunner {
    pub fn builder() -> JobRunnerBuilder {
        JobRunnerBuilder::default()
    }

    /// Registered job types in declaration order.
    pub fn job_types(&self) -> Vec<JobType> {
        JobType::ALL
            .into_iter()
            .filter(|t| self.executors.contains_key(t))
            .collect()
    }

    /// Resolve a wire job type and run it.
    pub async fn run(&self, job_type: &str, payload: Value) -> Result<Value, JobQueueError> {
        let job_type = job_type.parse::<JobType>()?;
        self.run_typed(job_type, payload).await
    }

    pub async fn run_typed(
        &self,
        job_type: JobType,
        payload: Value,
    ) -> Result<Value, JobQueueError> {
        // build() guarantees every JobType has an executor
        let executor = self
            .executors
            .get(&job_type)
            .cloned()
            .ok_or(JobQueueError::MissingExecutors(vec![job_type]))?;

        info!(job_type = %job_type, "running job");
        match executor.execute(payload).await {
            Ok(result) => {
                info!(job_type = %job_type, "job completed");
                Ok(result)
            }
            Err(e) => {
                error!(job_type = %job_type, error = %e, "job failed");
                Err(e)
            }
        }
    }
}

/// Collects executors and checks that the table is complete.
#[derive(Default)]
pub struct JobRunnerBuilder {
    executors: HashMap<JobType, Arc<dyn JobExecutor>>,
}

impl JobRunnerBuilder {
    /// Register an executor. A later registration for the same type replaces the earlier one.
    pub fn register<E: JobExecutor + 'static>(mut self, executor: E) -> Self {
        self.executors.insert(executor.job_type(), Arc::new(executor));
        self
    }

    /// Fails when any [`JobType`] has no executor.
    pub fn build(self) -> Result<JobRunner, JobQueueError> {
        let missing: Vec<JobType> = JobType::ALL
            .into_iter()
            .filter(|t| !self.executors.contains_key(t))
            .collect();
        if !missing.is_empty() {
            return Err(JobQueueError::MissingExecutors(missing));
        }
        Ok(JobRunner {
            executors: Arc::new(self.executors),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo(JobType);

    #[async_trait]
    impl JobExecutor for Echo {
        fn job_type(&self) -> JobType {
            self.0
        }

        async fn execute(&self, payload: Value) -> Result<Value, JobQueueError> {
            Ok(json!({ "jobType": self.0, "payload": payload }))
        }
    }

    struct Failing;

    #[async_trait]
    impl JobExecutor for Failing {
        fn job_type(&self) -> JobType {
            JobType::SyncData
        }

        async fn execute(&self, _payload: Value) -> Result<Value, JobQueueError> {
            Err(JobQueueError::ExecutionFailed("upstream unavailable".into()))
        }
    }

    fn full_builder() -> JobRunnerBuilder {
        JobType::ALL
            .into_iter()
            .fold(JobRunner::builder(), |b, t| b.register(Echo(t)))
    }

    #[test]
    fn test_build_reports_missing_executors() {
        let err = JobRunner::builder()
            .register(Echo(JobType::ProcessEmail))
            .build()
            .unwrap_err();
        match err {
            JobQueueError::MissingExecutors(missing) => assert_eq!(
                missing,
                vec![
                    JobType::GenerateReport,
                    JobType::SyncData,
                    JobType::AnalyzeResume
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_dispatches_by_type() {
        let runner = full_builder().build().unwrap();
        assert_eq!(runner.job_types(), JobType::ALL.to_vec());

        let result = runner
            .run("generateReport", json!({"reportType": "pipeline"}))
            .await
            .unwrap();
        assert_eq!(result["jobType"], "generateReport");
        assert_eq!(result["payload"]["reportType"], "pipeline");
    }

    #[tokio::test]
    async fn test_unknown_job_type() {
        let runner = full_builder().build().unwrap();
        let err = runner.run("sendFax", json!({})).await.unwrap_err();
        assert!(matches!(err, JobQueueError::UnknownJobType(ref t) if t == "sendFax"));
        assert!(err.to_string().contains("Unknown job type"));
    }

    #[tokio::test]
    async fn test_executor_failure_propagates() {
        let runner = full_builder().register(Failing).build().unwrap();
        let err = runner.run("syncData", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "job execution failed: upstream unavailable");
    }
}
