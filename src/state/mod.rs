//! Resume state module
//!
//! Persists pagination progress so an interrupted run can pick up where it
//! left off. State is keyed by the request fingerprint.
//!
//! # Overview
//!
//! The state module provides:
//! - `Continuation` - The `{cursor, max_id}` record
//! - `ResumeStore` - Directory of records, one per fingerprint
//! - `ResumeHandle` - Load, save and clear a single record

mod store;
mod types;

pub use store::{ResumeHandle, ResumeStore, DEFAULT_STATE_DIR};
pub use types::Continuation;
pub(crate) use types::token_from_value;

#[cfg(test)]
mod store_tests;
