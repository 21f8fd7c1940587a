use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use notification_services::{AvailabilityAlert, NotificationError, NotificationSink};
use rec_gov::{AvailabilitySnapshot, AvailabilitySource, RecGovError};
use tokio_util::sync::CancellationToken;

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// June 2024 at June Lake: 018 open 13th-16th, 005 reserved on the 14th,
/// T004 has no entry for the 16th.
pub(crate) fn june_lake_snapshot() -> AvailabilitySnapshot {
    let mut snapshot = AvailabilitySnapshot::new("232268");
    for day in 13..=16 {
        let key = format!("2024-06-{day:02}T00:00:00Z");
        snapshot.insert_day("018", key.clone(), "Available");
        let status = if day == 14 { "Reserved" } else { "Available" };
        snapshot.insert_day("005", key.clone(), status);
        if day < 16 {
            snapshot.insert_day("T004", key, "Available");
        }
    }
    snapshot
}

pub(crate) struct FakeSource {
    months: HashMap<(String, NaiveDate), AvailabilitySnapshot>,
    calls: Mutex<Vec<(String, NaiveDate)>>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            months: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    pub(crate) fn with_month(
        mut self,
        campground_id: &str,
        month: NaiveDate,
        snapshot: AvailabilitySnapshot,
    ) -> Self {
        self.months.insert((campground_id.to_string(), month), snapshot);
        self
    }

    /// Cancel `token` while serving the `call`-th fetch (1-based).
    pub(crate) fn cancel_on_call(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilitySource for FakeSource {
    async fn month_availability(
        &self,
        campground_id: &str,
        month: NaiveDate,
    ) -> Result<AvailabilitySnapshot, RecGovError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((campground_id.to_string(), month));
            calls.len()
        };

        if let Some((cancel_at, token)) = &self.cancel_on_call {
            if *cancel_at == call {
                token.cancel();
            }
        }

        self.months
            .get(&(campground_id.to_string(), month))
            .cloned()
            .ok_or_else(|| RecGovError::NotFound(campground_id.to_string()))
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    alerts: Mutex<Vec<AvailabilityAlert>>,
    fail: bool,
}

impl RecordingSink {
    pub(crate) fn failing() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn alerts(&self) -> Vec<AvailabilityAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, alert: &AvailabilityAlert) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Rejected(500));
        }
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
