//! Job DTOs exchanged with the processing service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::job::{Job, JobId, JobStatus};

/// Job as returned by `GET /jobs` and `GET /jobs/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub video_input: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /jobs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    pub jobs: Vec<JobRecord>,
}

/// Body of `POST /create-music`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedJob {
    pub job_id: JobId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// Body of `GET /videos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputList {
    pub videos: Vec<String>,
}

/// A job record that breaks the job invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("completed job {0} has no result file")]
    MissingResult(JobId),
}

impl TryFrom<JobRecord> for Job {
    type Error = RecordError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let mut job = Job::pending(record.id, record.created_at);

        // The service names completed jobs after their output file
        let result_file = record.filename.clone();
        if let Some(name) = record.filename.or(record.video_input) {
            job = job.with_display_name(name);
        }

        Ok(match record.status {
            JobStatus::Pending => job,
            JobStatus::Processing => job.processing(),
            JobStatus::Failed => job.failed(),
            JobStatus::Completed => match result_file {
                Some(file) => job.completed(file),
                None => return Err(RecordError::MissingResult(job.id)),
            },
        })
    }
}
