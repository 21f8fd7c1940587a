//! # Notification Services
//!
//! This crate provides the notification side of the application.
//! It defines the availability alert message and delivers it through ntfy.

/// Service definitions for delivering alerts.
pub mod service;
/// Types and structures used by notification services.
pub mod types;

pub use service::{DEFAULT_NTFY_TOPIC, DEFAULT_NTFY_URL, NtfyNotifier};
pub use types::{AvailabilityAlert, NotificationError, NotificationSink};
