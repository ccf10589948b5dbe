//! Lifecycle state and notifications exposed to presentation

use lofi_core::{Job, JobId, JobStatus};
use std::fmt;

/// Where a submitted job stands in the controller's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Nothing in flight
    Idle,
    /// Upload to the service in progress
    Submitting,
    /// Waiting for a terminal status
    Polling,
    /// Service reported `completed`
    Done,
    /// Service reported `failed`, the job vanished, or its result is missing
    Failed,
    /// Polling stopped by its owner; says nothing about the job itself
    Cancelled,
}

impl JobPhase {
    /// Whether the polling loop for this job has ended
    pub fn is_final(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// Latest human-readable activity line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub phase: JobPhase,
    pub job_id: Option<JobId>,
    pub message: String,
}

impl StatusLine {
    pub(crate) fn new(phase: JobPhase, job_id: Option<JobId>, message: impl Into<String>) -> Self {
        Self {
            phase,
            job_id,
            message: message.into(),
        }
    }

    pub(crate) fn idle() -> Self {
        Self::new(JobPhase::Idle, None, "")
    }
}

/// Why a job ended in [`JobPhase::Failed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The service reported the job as failed
    Reported,
    /// The service stopped recognising the job id
    Vanished { attempts: u32 },
    /// The service reported completion without a result file
    MissingResult,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported => f.write_str("the service reported a processing error"),
            Self::Vanished { attempts } => {
                write!(f, "job no longer known after {} status checks", attempts)
            }
            Self::MissingResult => f.write_str("the service reported completion without a result"),
        }
    }
}

/// Notification broadcast to presentation subscribers
///
/// Terminal events are sent once per job; transient poll errors never
/// produce an event.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Submitted { job_id: JobId },
    Progress { job_id: JobId, status: JobStatus },
    Completed { job: Job, download_url: String },
    Failed { job_id: JobId, reason: FailureReason },
    Cancelled { job_id: JobId },
    SubmissionFailed { reason: String },
    RefreshFailed { reason: String },
}

impl LifecycleEvent {
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Submitted { job_id }
            | Self::Progress { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Cancelled { job_id } => Some(job_id),
            Self::Completed { job, .. } => Some(&job.id),
            Self::SubmissionFailed { .. } | Self::RefreshFailed { .. } => None,
        }
    }
}
