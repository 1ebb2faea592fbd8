//! Data sync job implementation.

use serde_json::{json, Value};
use talenthub_job_queue::{async_trait, JobExecutor, JobQueueError, JobType};
use tracing::{info, warn};

use crate::{placeholder_result, str_field};

/// Executor for syncData jobs.
///
/// Would pull records (candidates, companies) from an external source such as
/// a job board or an HRIS.
#[derive(Debug, Default)]
pub struct SyncDataExecutor {}

impl SyncDataExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobExecutor for SyncDataExecutor {
    fn job_type(&self) -> JobType {
        JobType::SyncData
    }

    async fn execute(&self, payload: Value) -> Result<Value, JobQueueError> {
        let source = str_field(&payload, "source");
        let entity = str_field(&payload, "entity");

        info!(source = ?source, entity = ?entity, "executing syncData job");
        warn!("syncData job is a stub - nothing synchronized");

        Ok(placeholder_result(
            JobType::SyncData,
            "data sync is not implemented",
            json!({ "source": source, "recordsSynced": 0 }),
        ))
    }
}
