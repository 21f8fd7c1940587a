//! # RecGov
//!
//! This crate provides a client for the Rec.gov availability API, which reports
//! the per-day reservation status of every site in a campground, one month at a time.

/// Calendar helpers producing the day and month formats the Rec.gov API expects.
pub mod dates;
pub use dates::*;

/// Wire types, availability snapshots and errors.
mod types;
pub use types::*;

/// HTTP client for the month availability endpoint.
mod client;
pub use client::*;
