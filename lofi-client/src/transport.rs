//! Transport seam used by the lifecycle controller

use async_trait::async_trait;
use lofi_core::{Job, JobId, NewJob};

use crate::ServiceClient;
use crate::error::Result;

/// Authenticated I/O with the processing service
///
/// Each method performs a single exchange with no retries.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Full job history in service order
    ///
    /// A failure is never an empty history; callers keep what they had.
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    /// Submit a validated job, returning the id the service assigned
    async fn create_job(&self, job: &NewJob) -> Result<JobId>;

    /// Current state of one job
    async fn get_job_status(&self, job_id: &JobId) -> Result<Job>;

    /// Content of a completed job's result
    async fn fetch_result(&self, locator: &str) -> Result<Vec<u8>>;

    /// File names of every rendered video on the service
    async fn list_outputs(&self) -> Result<Vec<String>>;

    /// Link presentation can hand to the user for a result
    fn result_url(&self, locator: &str) -> String;
}

#[async_trait]
impl JobTransport for ServiceClient {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.fetch_jobs().await
    }

    async fn create_job(&self, job: &NewJob) -> Result<JobId> {
        self.submit_job(job).await
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<Job> {
        self.fetch_job(job_id).await
    }

    async fn fetch_result(&self, locator: &str) -> Result<Vec<u8>> {
        self.download(locator).await
    }

    async fn list_outputs(&self) -> Result<Vec<String>> {
        self.fetch_outputs().await
    }

    fn result_url(&self, locator: &str) -> String {
        self.download_url(locator)
    }
}
