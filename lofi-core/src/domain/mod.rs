//! Core domain types
//!
//! These types are what the controller and the presentation layer work with.
//! The service's wire format lives in [`crate::dto`] and is converted into
//! these types at the transport boundary.

pub mod job;
pub mod submission;
