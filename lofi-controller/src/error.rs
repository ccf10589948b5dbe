//! Controller error types

use lofi_client::TransportError;
use lofi_core::{JobId, ValidationError};
use thiserror::Error;

/// Why a submission did not produce a job
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Input refused before any network call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service could not be reached or rejected the upload
    #[error("could not create job: {0}")]
    Transport(#[from] TransportError),
}

/// Why a result could not be fetched
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The job has no result yet
    #[error("job {0} has no result to download")]
    NotReady(JobId),

    #[error("download failed: {0}")]
    Transport(#[from] TransportError),
}
