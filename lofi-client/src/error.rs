//! Error types for the service client

use lofi_core::JobId;
use lofi_core::dto::job::RecordError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while talking to the processing service
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Body returned by the service
        message: String,
    },

    /// Response body could not be understood
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Response parsed but breaks the job invariants
    #[error("Invalid job record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Base URL cannot carry endpoint paths
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// The service does not know this job id
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),

    /// No response within the allowed time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl TransportError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if the service reported the job as unknown
    pub fn is_unknown_job(&self) -> bool {
        matches!(self, Self::UnknownJob(_))
    }

    /// Check if the service answered with a record it should not have sent
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, Self::InvalidRecord(_))
    }

    /// Check if the exchange ran out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(TransportError::api_error(401, "bad token").is_client_error());
        assert!(TransportError::api_error(503, "busy").is_server_error());
        assert!(!TransportError::api_error(503, "busy").is_client_error());
    }

    #[test]
    fn test_timeout_and_unknown() {
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(TransportError::UnknownJob(JobId::from("J1")).is_unknown_job());
        assert!(!TransportError::Parse("x".into()).is_unknown_job());
    }

    #[test]
    fn test_invalid_record_conversion() {
        let err: TransportError = RecordError::MissingResult(JobId::from("J1")).into();
        assert!(err.is_invalid_record());
        assert!(!err.is_unknown_job());
    }
}
