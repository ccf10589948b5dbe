//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown for jobs the service did not name
pub const UNNAMED_JOB: &str = "Unnamed video";

/// Opaque job identifier assigned by the processing service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Job processing status
///
/// Status strings the client does not know are read as `Processing`:
/// anything that is not terminal keeps the job in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` end the lifecycle
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` goes strictly forward along
    /// `pending -> processing -> {completed | failed}`
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Processing,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote processing task as known to the client
///
/// The result locator is only reachable through [`Job::completed`], so a job
/// carries one exactly when its status is `Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    status: JobStatus,
    result_locator: Option<String>,
}

impl Job {
    /// A freshly submitted job, before the service reported anything
    pub fn pending(id: JobId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: None,
            created_at,
            status: JobStatus::Pending,
            result_locator: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn processing(mut self) -> Self {
        self.status = JobStatus::Processing;
        self.result_locator = None;
        self
    }

    pub fn failed(mut self) -> Self {
        self.status = JobStatus::Failed;
        self.result_locator = None;
        self
    }

    pub fn completed(mut self, result_locator: impl Into<String>) -> Self {
        self.status = JobStatus::Completed;
        self.result_locator = Some(result_locator.into());
        self
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// File name of the rendered video, present only once completed
    pub fn result_locator(&self) -> Option<&str> {
        self.result_locator.as_deref()
    }

    /// Name to show in history listings
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(UNNAMED_JOB)
    }
}
