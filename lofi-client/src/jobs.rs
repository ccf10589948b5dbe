//! Job-related API endpoints

use crate::ServiceClient;
use crate::error::{Result, TransportError};
use lofi_core::dto::job::{CreatedJob, JobList, JobRecord};
use lofi_core::{Job, JobId, NewJob};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

const VIDEO_MIME: &str = "video/mp4";

impl ServiceClient {
    // =============================================================================
    // Job History
    // =============================================================================

    /// List every job known to the service, in service order
    ///
    /// Records that break the job invariants are skipped with a warning so a
    /// single bad entry does not hide the rest of the history.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        let response = self.get(self.endpoint(&["jobs"])?).send().await?;
        let list: JobList = self.handle_response(response).await?;

        let total = list.jobs.len();
        let jobs: Vec<Job> = list
            .jobs
            .into_iter()
            .filter_map(|record| match Job::try_from(record) {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!("Skipping job record: {}", e);
                    None
                }
            })
            .collect();

        debug!("Fetched {} of {} job(s)", jobs.len(), total);
        Ok(jobs)
    }

    /// Get the current state of a job
    ///
    /// # Errors
    /// [`TransportError::UnknownJob`] when the service answers 404,
    /// [`TransportError::InvalidRecord`] for a completed job without a result.
    pub async fn fetch_job(&self, job_id: &JobId) -> Result<Job> {
        let url = self.endpoint(&["jobs", job_id.as_str()])?;
        let response = self.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TransportError::UnknownJob(job_id.clone()));
        }

        let record: JobRecord = self.handle_response(response).await?;
        Ok(Job::try_from(record)?)
    }

    // =============================================================================
    // Job Submission
    // =============================================================================

    /// Upload the background video and audio sources as a new job
    ///
    /// # Returns
    /// The id the service assigned to the job
    pub async fn submit_job(&self, job: &NewJob) -> Result<JobId> {
        let asset = job.asset();
        let file = Part::bytes(asset.bytes.clone())
            .file_name(asset.file_name.clone())
            .mime_str(VIDEO_MIME)?;

        let form = Form::new()
            .part("file", file)
            .text("urls", job.sources_field());

        let url = self.endpoint(&["create-music"])?;
        let response = self.post(url).multipart(form).send().await?;
        let created: CreatedJob = self.handle_response(response).await?;

        debug!(job_id = %created.job_id, "Service accepted job");
        Ok(created.job_id)
    }
}
