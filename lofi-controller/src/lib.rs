//! Lofi Controller
//!
//! Job lifecycle controller and job store for the Lofi Maker client.
//!
//! Architecture:
//! - Configuration: polling cadence and request bounds
//! - Store: observable cache of the service's job history
//! - Controller: submission and one polling loop per job
//! - Events: lifecycle notifications and status line for presentation
//!
//! Presentation never talks to the service directly: it calls
//! [`JobController`] operations, reads [`JobStore`] snapshots and listens to
//! [`LifecycleEvent`]s.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod store;

pub use config::ControllerConfig;
pub use controller::JobController;
pub use error::{DownloadError, SubmitError};
pub use events::{FailureReason, JobPhase, LifecycleEvent, StatusLine};
pub use store::{JobSnapshot, JobStore};
