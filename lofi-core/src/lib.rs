//! Lofi Core
//!
//! Core types shared by the Lofi Maker client crates.
//!
//! This crate contains:
//! - Domain types: jobs, their status lifecycle and validated submissions
//! - DTOs: the wire shapes exchanged with the processing service

pub mod domain;
pub mod dto;

pub use domain::job::{Job, JobId, JobStatus};
pub use domain::submission::{NewJob, ValidationError, VideoAsset, parse_sources};
