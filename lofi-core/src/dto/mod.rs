//! Data Transfer Objects for the processing service API
//!
//! These mirror the JSON bodies of the service endpoints. They are converted
//! into domain types at the transport boundary.

pub mod job;
