//! ID resolver module
//!
//! Lets users type a short, unambiguous prefix of a job id. Resolution runs
//! against the job history the controller just refreshed.

use anyhow::{Result, anyhow};
use lofi_core::{Job, JobId};

/// Resolve a job ID or prefix to a full ID
///
/// An exact match always wins; otherwise exactly one job must start with
/// the given prefix.
///
/// # Errors
/// Returns an error if:
/// - No job matches the prefix
/// - Multiple jobs match the prefix (ambiguous)
pub fn resolve_job_id(jobs: &[Job], input: &str) -> Result<JobId> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Job ID cannot be empty"));
    }

    if let Some(job) = jobs.iter().find(|j| j.id.as_str() == input) {
        return Ok(job.id.clone());
    }

    let matches: Vec<&Job> = jobs
        .iter()
        .filter(|j| j.id.as_str().starts_with(input))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", input)),
        [job] => Ok(job.id.clone()),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|j| j.id.as_str()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                input,
                ids.join(", ")
            ))
        }
    }
}
