//! Job lifecycle controller
//!
//! Submits jobs and drives one polling task per job id until the service
//! reports a terminal status. Each task keeps at most one status request in
//! flight, so observations for a job are always read in issue order.

use chrono::Utc;
use lofi_client::{JobTransport, TransportError};
use lofi_core::{Job, JobId, JobStatus, NewJob, VideoAsset};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::{DownloadError, SubmitError};
use crate::events::{FailureReason, JobPhase, LifecycleEvent, StatusLine};
use crate::store::JobStore;

const MSG_INVALID: &str = "Please select a video and at least one audio link.";
const MSG_UPLOADING: &str = "Uploading files...";
const MSG_UPLOAD_FAILED: &str = "Could not reach the API.";
const MSG_CREATED: &str = "Job created. Waiting for processing...";
const MSG_PROCESSING: &str = "Processing audio and video... this can take a few minutes.";
const MSG_DONE: &str = "Done!";
const MSG_FAILED: &str = "Video processing failed.";
const MSG_CANCELLED: &str = "Stopped following the job.";

/// Drives jobs from submission to a terminal status
///
/// Cloning is cheap and shares the same store, loops and subscribers.
#[derive(Clone)]
pub struct JobController {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn JobTransport>,
    config: ControllerConfig,
    store: JobStore,
    events: broadcast::Sender<LifecycleEvent>,
    status: watch::Sender<StatusLine>,
    loops: Mutex<Loops>,
    shutdown: CancellationToken,
}

#[derive(Default)]
struct Loops {
    next_generation: u64,
    active: HashMap<JobId, ActiveLoop>,
    phases: HashMap<JobId, watch::Receiver<JobPhase>>,
    /// Ended loops, oldest first; bounded by `phase_history`
    finished: VecDeque<JobId>,
}

struct ActiveLoop {
    generation: u64,
    cancel: CancellationToken,
}

impl JobController {
    /// Creates a controller with an empty store
    pub fn new(transport: Arc<dyn JobTransport>, config: ControllerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        let (status, _) = watch::channel(StatusLine::idle());

        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                store: JobStore::new(),
                events,
                status,
                loops: Mutex::new(Loops::default()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Read access to the job history
    pub fn store(&self) -> &JobStore {
        &self.inner.store
    }

    /// Lifecycle notifications from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }

    /// Latest activity line, updated on every transition and poll
    pub fn status(&self) -> watch::Receiver<StatusLine> {
        self.inner.status.subscribe()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // =============================================================================
    // Submission
    // =============================================================================

    /// Validates the input, creates the job and starts polling it
    ///
    /// Invalid input is refused before any network call.
    pub async fn submit(
        &self,
        asset: VideoAsset,
        sources: Vec<String>,
    ) -> Result<JobId, SubmitError> {
        let job = match NewJob::new(asset, sources) {
            Ok(job) => job,
            Err(e) => {
                warn!("Submission refused: {}", e);
                self.inner.set_status(JobPhase::Idle, None, MSG_INVALID);
                self.inner.emit(LifecycleEvent::SubmissionFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        self.submit_job(job).await
    }

    /// Creates an already validated job and starts polling it
    pub async fn submit_job(&self, job: NewJob) -> Result<JobId, SubmitError> {
        let inner = &self.inner;
        inner.set_status(JobPhase::Submitting, None, MSG_UPLOADING);
        info!(
            file = %job.asset().file_name,
            sources = job.sources().len(),
            "Submitting job"
        );

        let created = inner.bounded(inner.transport.create_job(&job)).await;

        let job_id = match created {
            Ok(job_id) => job_id,
            Err(e) => {
                error!("Failed to create job: {}", e);
                inner.set_status(JobPhase::Idle, None, MSG_UPLOAD_FAILED);
                inner.emit(LifecycleEvent::SubmissionFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        info!(job_id = %job_id, "Job created");
        inner.store.insert_pending(
            Job::pending(job_id.clone(), Utc::now()).with_display_name(&job.asset().file_name),
        );
        inner.set_status(JobPhase::Polling, Some(job_id.clone()), MSG_CREATED);
        inner.emit(LifecycleEvent::Submitted {
            job_id: job_id.clone(),
        });

        self.start_polling(&job_id);
        Ok(job_id)
    }

    // =============================================================================
    // Polling Loops
    // =============================================================================

    /// Follows an existing job until it reaches a terminal status
    ///
    /// Returns `false` if a loop for this id is already running.
    pub fn watch(&self, job_id: &JobId) -> bool {
        self.start_polling(job_id)
    }

    /// Stops polling a job without touching its stored status
    ///
    /// A status request already in flight completes and its result is dropped.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        match self.inner.loops().active.get(job_id) {
            Some(active) => {
                info!(job_id = %job_id, "Cancelling polling loop");
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every polling loop, e.g. on view teardown
    ///
    /// Loops started afterwards end immediately.
    pub fn shutdown(&self) {
        info!("Shutting down all polling loops");
        self.inner.shutdown.cancel();
    }

    /// Ids with a running polling loop
    pub fn active_jobs(&self) -> Vec<JobId> {
        self.inner.loops().active.keys().cloned().collect()
    }

    /// Phase of a job this controller has polled, if any
    ///
    /// Only the most recent `phase_history` ended loops are remembered.
    pub fn phase(&self, job_id: &JobId) -> Option<JobPhase> {
        self.inner.loops().phases.get(job_id).map(|rx| *rx.borrow())
    }

    /// Waits for the polling loop of a job to end
    ///
    /// Returns `None` for ids this controller never polled.
    pub async fn wait(&self, job_id: &JobId) -> Option<JobPhase> {
        let mut rx = self.inner.loops().phases.get(job_id)?.clone();

        let result = rx.wait_for(|phase| phase.is_final()).await.map(|phase| *phase);
        Some(result.unwrap_or_else(|_| *rx.borrow()))
    }

    fn start_polling(&self, job_id: &JobId) -> bool {
        let (cancel, generation, phase_tx) = {
            let mut loops = self.inner.loops();
            if loops.active.contains_key(job_id) {
                debug!(job_id = %job_id, "Polling loop already running");
                return false;
            }

            let generation = loops.next_generation;
            loops.next_generation += 1;

            let cancel = self.inner.shutdown.child_token();
            let (phase_tx, phase_rx) = watch::channel(JobPhase::Polling);
            loops.active.insert(
                job_id.clone(),
                ActiveLoop {
                    generation,
                    cancel: cancel.clone(),
                },
            );
            loops.phases.insert(job_id.clone(), phase_rx);
            loops.finished.retain(|id| id != job_id);
            (cancel, generation, phase_tx)
        };

        let inner = Arc::clone(&self.inner);
        let job_id = job_id.clone();
        tokio::spawn(async move {
            let phase = inner.poll_until_terminal(&job_id, &cancel).await;
            inner.finish_loop(&job_id, generation);
            phase_tx.send_replace(phase);
        });

        true
    }

    // =============================================================================
    // History
    // =============================================================================

    /// Reloads the whole history from the service
    ///
    /// On failure the store keeps its previous contents and running loops are
    /// left alone.
    pub async fn refresh(&self) -> Result<usize, TransportError> {
        self.inner.refresh().await
    }

    /// Names of the rendered videos available on the service
    pub async fn outputs(&self) -> Result<Vec<String>, TransportError> {
        self.inner.bounded(self.inner.transport.list_outputs()).await
    }

    /// Link to a completed job's result
    pub fn download_url(&self, job: &Job) -> Option<String> {
        job.result_locator()
            .map(|locator| self.inner.transport.result_url(locator))
    }

    /// Fetches a completed job's result
    pub async fn download(&self, job: &Job) -> Result<Vec<u8>, DownloadError> {
        let locator = job
            .result_locator()
            .ok_or_else(|| DownloadError::NotReady(job.id.clone()))?;

        let limit = self.inner.config.download_timeout;
        let bytes = self
            .inner
            .bounded_by(limit, self.inner.transport.fetch_result(locator))
            .await?;

        Ok(bytes)
    }
}

impl Inner {
    fn loops(&self) -> MutexGuard<'_, Loops> {
        self.loops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: LifecycleEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn set_status(&self, phase: JobPhase, job_id: Option<JobId>, message: &str) {
        self.status.send_replace(StatusLine::new(phase, job_id, message));
    }

    /// Applies the request timeout to a transport call
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        self.bounded_by(self.config.request_timeout, call).await
    }

    async fn bounded_by<T>(
        &self,
        limit: Duration,
        call: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        match time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(limit)),
        }
    }

    async fn refresh(&self) -> Result<usize, TransportError> {
        match self.bounded(self.transport.list_jobs()).await {
            Ok(jobs) => {
                let count = jobs.len();
                self.store.replace(jobs);
                debug!("Job history refreshed ({} job(s))", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to refresh job history: {}", e);
                self.emit(LifecycleEvent::RefreshFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn finish_loop(&self, job_id: &JobId, generation: u64) {
        let mut loops = self.loops();
        let current = loops
            .active
            .get(job_id)
            .is_some_and(|active| active.generation == generation);
        if !current {
            return;
        }

        loops.active.remove(job_id);
        loops.finished.push_back(job_id.clone());
        while loops.finished.len() > self.config.phase_history {
            if let Some(oldest) = loops.finished.pop_front() {
                loops.phases.remove(&oldest);
            }
        }
    }

    /// Polls one job until a terminal status or cancellation
    async fn poll_until_terminal(&self, job_id: &JobId, cancel: &CancellationToken) -> JobPhase {
        info!(
            job_id = %job_id,
            "Polling job every {:?}", self.config.poll_interval
        );

        let mut last_seen = self.store.get(job_id).map(|job| job.status());
        let mut unknown_polls = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(job_id),
                _ = time::sleep(self.config.poll_interval) => {}
            }

            debug!(job_id = %job_id, "Checking job status");
            let result = self.bounded(self.transport.get_job_status(job_id)).await;

            if cancel.is_cancelled() {
                debug!(job_id = %job_id, "Discarding status received after cancel");
                return self.cancelled(job_id);
            }

            let job = match result {
                Ok(job) => {
                    unknown_polls = 0;
                    job
                }
                Err(TransportError::InvalidRecord(e)) => {
                    // Terminal answer the job cannot be built from
                    warn!(job_id = %job_id, "Service sent an unusable record: {}", e);
                    return self.failed(job_id, None, FailureReason::MissingResult).await;
                }
                Err(e) if e.is_unknown_job() => {
                    unknown_polls += 1;
                    if unknown_polls >= self.config.max_unknown_polls {
                        warn!(
                            job_id = %job_id,
                            "Job unknown to the service {} times in a row, giving up",
                            unknown_polls
                        );
                        let reason = FailureReason::Vanished {
                            attempts: unknown_polls,
                        };
                        return self.failed(job_id, None, reason).await;
                    }
                    warn!(
                        job_id = %job_id,
                        "Job unknown to the service ({}/{}), retrying",
                        unknown_polls, self.config.max_unknown_polls
                    );
                    continue;
                }
                Err(e) => {
                    unknown_polls = 0;
                    warn!(job_id = %job_id, "Status check failed, retrying next tick: {}", e);
                    continue;
                }
            };

            let status = job.status();
            if let Some(previous) = last_seen {
                if previous != status && !previous.can_advance_to(status) {
                    warn!(
                        job_id = %job_id,
                        "Ignoring status {} after {}", status, previous
                    );
                    continue;
                }
            }
            let changed = last_seen != Some(status);
            last_seen = Some(status);

            match status {
                JobStatus::Completed => return self.completed(job).await,
                JobStatus::Failed => {
                    return self
                        .failed(job_id, Some(job), FailureReason::Reported)
                        .await;
                }
                JobStatus::Pending | JobStatus::Processing => {
                    self.store.observe(&job);
                    self.set_status(JobPhase::Polling, Some(job_id.clone()), MSG_PROCESSING);
                    if changed {
                        debug!(job_id = %job_id, "Job is {}", status);
                        self.emit(LifecycleEvent::Progress {
                            job_id: job_id.clone(),
                            status,
                        });
                    }
                }
            }
        }
    }

    async fn completed(&self, job: Job) -> JobPhase {
        info!(job_id = %job.id, "Job completed");
        self.store.observe(&job);
        // Failure is reported through RefreshFailed; the job itself is done
        let _ = self.refresh().await;

        let download_url = job
            .result_locator()
            .map(|locator| self.transport.result_url(locator))
            .unwrap_or_default();

        self.set_status(JobPhase::Done, Some(job.id.clone()), MSG_DONE);
        self.emit(LifecycleEvent::Completed { job, download_url });
        JobPhase::Done
    }

    async fn failed(&self, job_id: &JobId, job: Option<Job>, reason: FailureReason) -> JobPhase {
        warn!(job_id = %job_id, "Job failed: {}", reason);
        if let Some(job) = &job {
            self.store.observe(job);
        }
        let _ = self.refresh().await;

        self.set_status(JobPhase::Failed, Some(job_id.clone()), MSG_FAILED);
        self.emit(LifecycleEvent::Failed {
            job_id: job_id.clone(),
            reason,
        });
        JobPhase::Failed
    }

    fn cancelled(&self, job_id: &JobId) -> JobPhase {
        info!(job_id = %job_id, "Polling cancelled");
        self.set_status(JobPhase::Cancelled, Some(job_id.clone()), MSG_CANCELLED);
        self.emit(LifecycleEvent::Cancelled {
            job_id: job_id.clone(),
        });
        JobPhase::Cancelled
    }
}
