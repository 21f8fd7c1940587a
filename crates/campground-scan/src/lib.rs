//! # Campground Scan
//!
//! This crate provides the availability tracking engine. It builds the table of
//! tracked sites for each configured campground, then sweeps every campground and
//! requested stay on a fixed interval, alerting once per site when the whole stay
//! becomes bookable.

/// Configuration types and errors for scan operations
mod scan_types;
pub use scan_types::*;

/// Table of tracked sites and their notification eligibility
mod site_catalog;
pub use site_catalog::*;

/// The polling loop
mod executor;
pub use executor::*;

#[cfg(test)]
mod test_support;
