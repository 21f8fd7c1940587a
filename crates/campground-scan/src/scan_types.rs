use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use notification_services::NotificationError;
use rec_gov::RecGovError;
use validator::Validate;

/// A campground to track, as configured
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Campground {
    /// Human label used in alerts
    #[validate(length(min = 1, message = "Campground label is required"))]
    pub label: String,

    /// Recreation.gov campground ID
    #[validate(length(min = 1, message = "Campground ID is required"))]
    pub campground_id: String,
}

impl Campground {
    /// Create a validated campground entry
    pub fn new(label: impl Into<String>, campground_id: impl Into<String>) -> Result<Self, ScanError> {
        let campground = Self {
            label: label.into(),
            campground_id: campground_id.into(),
        };
        campground
            .validate()
            .map_err(|e| ScanError::Validation(e.to_string()))?;
        Ok(campground)
    }
}

/// Parses `label=id`, e.g. `june_lake=232268`
impl FromStr for Campground {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, campground_id) = s.split_once('=').ok_or_else(|| {
            ScanError::Validation(format!("expected LABEL=ID, got '{}'", s))
        })?;
        Self::new(label.trim(), campground_id.trim())
    }
}

/// An inclusive stay to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct DateRangeRequest {
    /// First night
    pub start: NaiveDate,
    /// Last night
    pub end: NaiveDate,
}

impl DateRangeRequest {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScanError> {
        let range = Self { start, end };
        range
            .validate()
            .map_err(|e| ScanError::Validation(e.to_string()))?;
        Ok(range)
    }
}

/// Parses `START:END` with dates as `YYYY-MM-DD`, e.g. `2024-06-13:2024-06-16`
impl FromStr for DateRangeRequest {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once(':').ok_or_else(|| {
            ScanError::Validation(format!("expected START:END, got '{}'", s))
        })?;
        Self::new(parse_date(start)?, parse_date(end)?)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ScanError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| ScanError::Validation(format!("invalid date '{}': {}", s, e)))
}

fn validate_date_order(range: &DateRangeRequest) -> Result<(), validator::ValidationError> {
    if range.start > range.end {
        return Err(validator::ValidationError::new("invalid_date_range")
            .with_message("start date must not be after end date".into()));
    }
    Ok(())
}

/// Whether the loop keeps polling or stops after one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Sweep, sleep, repeat until cancelled
    #[default]
    Continuous,
    /// Sweep once and return
    SinglePass,
}

/// Which months are fetched for a requested stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthCoverage {
    /// Only the month of the start date. Days of a stay that fall in a later
    /// month are never reported, so such stays never qualify.
    #[default]
    StartMonth,
    /// Every month the stay touches, merged into one snapshot
    AllMonths,
}

/// Configuration of the scan executor
#[derive(Debug, Clone)]
pub struct ScanExecutorConfig {
    /// Stays to check, in order
    pub date_ranges: Vec<DateRangeRequest>,

    /// Pause between sweeps (default: 60 seconds)
    pub poll_interval: Duration,

    /// Continuous or single pass (default: continuous)
    pub run_mode: RunMode,

    /// Month fetching policy (default: start month only)
    pub month_coverage: MonthCoverage,
}

impl Default for ScanExecutorConfig {
    fn default() -> Self {
        Self {
            date_ranges: Vec::new(),
            poll_interval: Duration::from_secs(60),
            run_mode: RunMode::Continuous,
            month_coverage: MonthCoverage::StartMonth,
        }
    }
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Availability provider error
    #[error("Recreation.gov error: {0}")]
    RecGov(#[from] RecGovError),

    /// Alert delivery error
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Invalid configuration value
    #[error("Validation error: {0}")]
    Validation(String),
}
