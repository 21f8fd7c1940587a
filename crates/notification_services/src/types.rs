use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

/// Errors raised while delivering notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The ntfy request never produced a response.
    #[error("ntfy request failed: {0}")]
    Http(String),

    /// ntfy answered with a non-success status.
    #[error("ntfy rejected notification with status {0}")]
    Rejected(u16),
}

/// A site that became available for a whole requested stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityAlert {
    /// Human-readable site identifier
    pub site: String,
    /// First night of the stay
    pub start_date: NaiveDate,
    /// Last night of the stay
    pub end_date: NaiveDate,
    /// Campground label as configured
    pub campground: String,
}

impl AvailabilityAlert {
    /// Creates a new alert.
    pub fn new(
        site: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        campground: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            start_date,
            end_date,
            campground: campground.into(),
        }
    }

    /// The message body sent to subscribers.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AvailabilityAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Site {} is available for reservation from {} to {} at {}",
            self.site,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d"),
            self.campground
        )
    }
}

/// Destination for availability alerts.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one alert.
    async fn notify(&self, alert: &AvailabilityAlert) -> Result<(), NotificationError>;
}
