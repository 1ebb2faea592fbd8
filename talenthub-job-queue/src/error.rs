//! Error types for the job queue system.

use thiserror::Error;

use crate::types::JobType;

/// Errors that may occur while enqueuing or running jobs.
#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("no executor registered for job types: {}", join_types(.0))]
    MissingExecutors(Vec<JobType>),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("queue provider request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("queue provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("failed to parse provider response: {0}")]
    ParseError(String),

    #[error("job execution failed: {0}")]
    ExecutionFailed(String),
}

impl JobQueueError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Configuration problems are fatal and never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured(_) | Self::InvalidUrl(_) | Self::MissingExecutors(_)
        )
    }
}

fn join_types(types: &[JobType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(JobQueueError::Timeout.is_retryable());
        assert!(JobQueueError::Network("reset".into()).is_retryable());
        assert!(JobQueueError::Provider {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(JobQueueError::Provider {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!JobQueueError::Provider {
            status: 401,
            message: String::new()
        }
        .is_retryable());
        assert!(!JobQueueError::NotConfigured("queue token").is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            JobQueueError::UnknownJobType("sendFax".into()).to_string(),
            "Unknown job type: sendFax"
        );
        assert_eq!(
            JobQueueError::MissingExecutors(vec![JobType::SyncData, JobType::AnalyzeResume])
                .to_string(),
            "no executor registered for job types: syncData, analyzeResume"
        );
    }
}
