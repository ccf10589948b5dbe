//! Job store
//!
//! Client-side cache of the service's job history. Every write publishes a
//! freshly built snapshot through a watch channel; nothing is patched in
//! place, so readers always see a complete, consistent list. Concurrent
//! refreshes resolve last-writer-wins: each one replaces the whole list.

use lofi_core::{Job, JobId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Immutable view of the store at one point in time
pub type JobSnapshot = Arc<[Job]>;

/// Ordered collection of jobs, unique by id
///
/// Cloning shares the same underlying store. Writes are reserved to the
/// controller; presentation reads snapshots or subscribes to changes.
#[derive(Debug, Clone)]
pub struct JobStore {
    tx: Arc<watch::Sender<JobSnapshot>>,
}

impl JobStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(JobSnapshot::from(Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    /// Current contents in display order
    pub fn snapshot(&self) -> JobSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.tx.subscribe()
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.tx.borrow().iter().find(|job| &job.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Replaces the whole contents with a fresh listing
    ///
    /// Later duplicates of an id are dropped.
    pub(crate) fn replace(&self, jobs: Vec<Job>) {
        let mut seen = HashSet::with_capacity(jobs.len());
        let jobs: Vec<Job> = jobs
            .into_iter()
            .filter(|job| {
                let fresh = seen.insert(job.id.clone());
                if !fresh {
                    warn!(job_id = %job.id, "Duplicate job in listing, keeping first");
                }
                fresh
            })
            .collect();

        self.tx.send_replace(jobs.into());
    }

    /// Publishes a just-submitted job at the front of the list
    pub(crate) fn insert_pending(&self, job: Job) {
        self.tx.send_modify(|snapshot| {
            let mut jobs = Vec::with_capacity(snapshot.len() + 1);
            jobs.extend(snapshot.iter().filter(|j| j.id != job.id).cloned());
            jobs.insert(0, job);
            *snapshot = jobs.into();
        });
    }

    /// Reflects the latest status seen for a tracked job
    ///
    /// Only forward transitions are applied and unknown ids are ignored.
    /// Returns whether a new snapshot was published.
    pub(crate) fn observe(&self, job: &Job) -> bool {
        self.tx.send_if_modified(|snapshot| {
            let Some(pos) = snapshot.iter().position(|j| j.id == job.id) else {
                return false;
            };

            let current = &snapshot[pos];
            if !current.status().can_advance_to(job.status()) {
                return false;
            }

            let mut next = job.clone();
            if next.display_name.is_none() {
                next.display_name = current.display_name.clone();
            }

            let mut jobs = snapshot.to_vec();
            jobs[pos] = next;
            *snapshot = jobs.into();
            true
        })
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
