//! Core types for the job queue system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JobQueueError;

/// Closed set of job types the runner knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobType {
    ProcessEmail,
    GenerateReport,
    SyncData,
    AnalyzeResume,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        Self::ProcessEmail,
        Self::GenerateReport,
        Self::SyncData,
        Self::AnalyzeResume,
    ];

    /// Wire name of the job type.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProcessEmail => "processEmail",
            Self::GenerateReport => "generateReport",
            Self::SyncData => "syncData",
            Self::AnalyzeResume => "analyzeResume",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = JobQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| JobQueueError::UnknownJobType(s.to_string()))
    }
}

/// Job descriptor sent to the queue provider and delivered back to the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub job_type: JobType,
    pub payload: Value,
}

impl JobRequest {
    #[inline]
    pub fn new(job_type: JobType, payload: Value) -> Self {
        Self { job_type, payload }
    }
}

/// Optional modifiers attached as headers to an outbound publish request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduplication_id: Option<String>,
}

impl EnqueueOptions {
    #[inline]
    pub fn delay(mut self, seconds: u64) -> Self {
        self.delay_seconds = Some(seconds);
        self
    }

    #[inline]
    pub fn deduplication_id(mut self, id: impl Into<String>) -> Self {
        self.deduplication_id = Some(id.into());
        self
    }
}

/// Result returned after a job has been handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResult {
    pub message_id: String,
    /// True when no provider was contacted (development mode without a token).
    pub simulated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_type_round_trips_through_str() {
        for job_type in JobType::ALL {
            assert_eq!(job_type.as_str().parse::<JobType>().unwrap(), job_type);
        }
        let err = "ProcessEmail".parse::<JobType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown job type: ProcessEmail");
    }

    #[test]
    fn test_job_request_wire_format() {
        let request = JobRequest::new(JobType::ProcessEmail, json!({"to": "a@b.com"}));
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"jobType":"processEmail","payload":{"to":"a@b.com"}}"#
        );
    }

    #[test]
    fn test_job_type_serde_matches_as_str() {
        for job_type in JobType::ALL {
            assert_eq!(
                serde_json::to_value(job_type).unwrap(),
                Value::String(job_type.as_str().to_string())
            );
        }
    }

    #[test]
    fn test_enqueue_options_builder() {
        let options = EnqueueOptions::default().delay(30).deduplication_id("abc123");
        assert_eq!(options.delay_seconds, Some(30));
        assert_eq!(options.deduplication_id.as_deref(), Some("abc123"));

        let parsed: EnqueueOptions =
            serde_json::from_value(json!({"deduplicationId": "x"})).unwrap();
        assert_eq!(parsed.delay_seconds, None);
        assert_eq!(parsed.deduplication_id.as_deref(), Some("x"));
    }
}
