//! Job handlers for the talenthub backend.
//!
//! This crate provides implementations of the
//! [`JobExecutor`](talenthub_job_queue::JobExecutor) trait for every
//! [`JobType`]. None of them perform real work yet: each logs its payload and
//! returns a canned result flagged with `"placeholder": true`.
//!
//! # Job Types
//!
//! - `processEmail` - Send a transactional email
//! - `generateReport` - Render a recruiting report
//! - `syncData` - Pull records from an external system
//! - `analyzeResume` - Score a candidate resume against a job opening
//!
//! # Usage
//!
//! ```rust,no_run
//! use talenthub_jobs::build_runner;
//!
//! let runner = build_runner().expect("every job type has a handler");
//! ```

mod email;
mod report;
mod resume;
mod sync;

pub use email::ProcessEmailExecutor;
pub use report::GenerateReportExecutor;
pub use resume::AnalyzeResumeExecutor;
pub use sync::SyncDataExecutor;

use serde_json::{json, Map, Value};
use talenthub_job_queue::{JobQueueError, JobRunner, JobRunnerBuilder, JobType};

/// Register all available job executors.
pub fn register_all_executors(builder: JobRunnerBuilder) -> JobRunnerBuilder {
    builder
        .register(ProcessEmailExecutor::new())
        .register(GenerateReportExecutor::new())
        .register(SyncDataExecutor::new())
        .register(AnalyzeResumeExecutor::new())
}

/// Build a runner with every handler registered.
pub fn build_runner() -> Result<JobRunner, JobQueueError> {
    register_all_executors(JobRunner::builder()).build()
}

/// Canned result shared by the placeholder handlers.
pub(crate) fn placeholder_result(job_type: JobType, detail: &str, fields: Value) -> Value {
    let mut object = Map::new();
    object.insert("jobType".to_string(), json!(job_type));
    object.insert("status".to_string(), json!("completed"));
    object.insert("placeholder".to_string(), Value::Bool(true));
    object.insert("detail".to_string(), json!(detail));
    if let Value::Object(extra) = fields {
        object.extend(extra);
    }
    Value::Object(object)
}

/// Read a string field from a payload of any shape.
#[inline]
pub(crate) fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}
