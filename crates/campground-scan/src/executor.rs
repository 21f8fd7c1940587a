use std::sync::Arc;

use notification_services::{AvailabilityAlert, NotificationSink};
use rec_gov::{AvailabilitySnapshot, AvailabilitySource, date_range, month_start, months_spanned};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::scan_types::*;
use crate::site_catalog::{SiteCatalog, TrackedCampground};

/// Counters for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Campground × date range pairs checked
    pub ranges_checked: usize,
    /// Eligible sites whose availability was evaluated
    pub sites_checked: usize,
    /// Alerts delivered
    pub notifications_sent: usize,
}

/// Main scan execution engine
///
/// Owns the site catalog for the duration of the run. Every sweep walks the
/// campgrounds and date ranges in configuration order and alerts once per
/// site, the first time a whole stay is available.
pub struct ScanExecutor {
    catalog: SiteCatalog,
    source: Arc<dyn AvailabilitySource>,
    notifier: Arc<dyn NotificationSink>,
    config: ScanExecutorConfig,
}

impl ScanExecutor {
    /// Create an executor over an already built catalog
    pub fn new(
        catalog: SiteCatalog,
        source: Arc<dyn AvailabilitySource>,
        notifier: Arc<dyn NotificationSink>,
        config: ScanExecutorConfig,
    ) -> Self {
        Self {
            catalog,
            source,
            notifier,
            config,
        }
    }

    /// The tracking table as it currently stands
    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    /// Run sweeps until cancelled, or once in single-pass mode.
    ///
    /// Returns the number of completed sweeps. The first fetch or delivery
    /// error ends the run.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<u64, ScanError> {
        info!(
            "Starting scan of {} campgrounds, {} date ranges, {} sites",
            self.catalog.campgrounds().len(),
            self.config.date_ranges.len(),
            self.catalog.tracked_count()
        );

        let mut sweeps = 0;

        loop {
            if cancel.is_cancelled() {
                info!("Scan cancelled");
                break;
            }

            let report = self.sweep().await?;
            sweeps += 1;

            info!(
                "Sweep {} done: {} ranges, {} sites checked, {} notifications, {} sites still eligible",
                sweeps,
                report.ranges_checked,
                report.sites_checked,
                report.notifications_sent,
                self.catalog.eligible_count()
            );

            if self.config.run_mode == RunMode::SinglePass {
                break;
            }

            debug!("sleeping for {:?}", self.config.poll_interval);

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Scan cancelled");
                    break;
                }
                _ = sleep(self.config.poll_interval) => {}
            }
        }

        Ok(sweeps)
    }

    /// One pass over every campground and date range
    pub async fn sweep(&mut self) -> Result<SweepReport, ScanError> {
        let mut report = SweepReport::default();

        for campground in self.catalog.campgrounds_mut() {
            for range in &self.config.date_ranges {
                let snapshot = fetch_snapshot(
                    self.source.as_ref(),
                    &campground.campground_id,
                    range,
                    self.config.month_coverage,
                )
                .await?;

                check_range(
                    campground,
                    range,
                    &snapshot,
                    self.notifier.as_ref(),
                    &mut report,
                )
                .await?;

                report.ranges_checked += 1;
            }
        }

        Ok(report)
    }
}

async fn fetch_snapshot(
    source: &dyn AvailabilitySource,
    campground_id: &str,
    range: &DateRangeRequest,
    coverage: MonthCoverage,
) -> Result<AvailabilitySnapshot, ScanError> {
    let snapshot = match coverage {
        MonthCoverage::StartMonth => {
            source
                .month_availability(campground_id, month_start(range.start))
                .await?
        }
        MonthCoverage::AllMonths => {
            let mut snapshot = AvailabilitySnapshot::new(campground_id);
            for month in months_spanned(range.start, range.end) {
                snapshot.merge(source.month_availability(campground_id, month).await?);
            }
            snapshot
        }
    };

    debug!(
        "fetched {} sites for campground {} ({} to {})",
        snapshot.len(),
        snapshot.campground_id(),
        range.start,
        range.end
    );

    Ok(snapshot)
}

async fn check_range(
    campground: &mut TrackedCampground,
    range: &DateRangeRequest,
    snapshot: &AvailabilitySnapshot,
    notifier: &dyn NotificationSink,
    report: &mut SweepReport,
) -> Result<(), ScanError> {
    let days = date_range(range.start, range.end);

    for site in snapshot.site_ids() {
        if !campground.is_eligible(site) {
            continue;
        }
        report.sites_checked += 1;

        if !snapshot.is_fully_available(site, &days) {
            debug!(
                "no availabilities for {} {} {} {}",
                range.start, range.end, campground.label, site
            );
            continue;
        }

        debug!(
            "!Availabilities for {} {} {} {}",
            range.start, range.end, campground.label, site
        );

        let alert = AvailabilityAlert::new(site, range.start, range.end, campground.label.clone());
        notifier.notify(&alert).await?;
        if !campground.mark_notified(site) {
            debug!("{} at {} was already marked notified", site, campground.label);
        }
        report.notifications_sent += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::*;

    fn range(start: &str, end: &str) -> DateRangeRequest {
        DateRangeRequest::new(date(start), date(end)).unwrap()
    }

    fn june_lake_catalog() -> SiteCatalog {
        SiteCatalog::from_entries([TrackedCampground::new(
            "june_lake",
            "232268",
            ["005", "018", "T004"],
        )])
    }

    fn single_pass(date_ranges: Vec<DateRangeRequest>) -> ScanExecutorConfig {
        ScanExecutorConfig {
            date_ranges,
            run_mode: RunMode::SinglePass,
            ..ScanExecutorConfig::default()
        }
    }

    fn executor(
        catalog: SiteCatalog,
        source: &Arc<FakeSource>,
        sink: &Arc<RecordingSink>,
        config: ScanExecutorConfig,
    ) -> ScanExecutor {
        ScanExecutor::new(catalog, source.clone(), sink.clone(), config)
    }

    #[tokio::test]
    async fn test_notifies_fully_available_site_once() {
        let source = Arc::new(
            FakeSource::new().with_month("232268", date("2024-06-01"), june_lake_snapshot()),
        );
        let sink = Arc::new(RecordingSink::default());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            single_pass(vec![range("2024-06-13", "2024-06-16")]),
        );

        let sweeps = executor.run(CancellationToken::new()).await.unwrap();

        assert_eq!(sweeps, 1);
        assert_eq!(
            sink.alerts(),
            vec![AvailabilityAlert::new(
                "018",
                date("2024-06-13"),
                date("2024-06-16"),
                "june_lake"
            )]
        );
        assert_eq!(
            sink.alerts()[0].message(),
            "Site 018 is available for reservation from 2024-06-13 to 2024-06-16 at june_lake"
        );
        assert!(!executor.catalog().is_eligible("june_lake", "018"));
        assert!(executor.catalog().is_eligible("june_lake", "005"));
        assert!(executor.catalog().is_eligible("june_lake", "T004"));
        assert_eq!(source.calls(), vec![("232268".to_string(), date("2024-06-01"))]);
    }

    #[tokio::test]
    async fn test_site_is_never_notified_twice() {
        let source = Arc::new(
            FakeSource::new().with_month("232268", date("2024-06-01"), june_lake_snapshot()),
        );
        let sink = Arc::new(RecordingSink::default());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            single_pass(vec![
                range("2024-06-13", "2024-06-14"),
                range("2024-06-15", "2024-06-16"),
            ]),
        );

        let first = executor.sweep().await.unwrap();
        let second = executor.sweep().await.unwrap();

        // 018 fits both ranges but only fires for the first one
        let sites: Vec<_> = sink.alerts().into_iter().map(|a| (a.site, a.start_date)).collect();
        assert_eq!(
            sites,
            vec![
                ("018".to_string(), date("2024-06-13")),
                ("T004".to_string(), date("2024-06-13")),
                ("005".to_string(), date("2024-06-15")),
            ]
        );
        assert_eq!(first.notifications_sent, 3);
        assert_eq!(second.notifications_sent, 0);
        assert_eq!(second.sites_checked, 0);
        assert_eq!(executor.catalog().eligible_count(), 0);
    }

    #[tokio::test]
    async fn test_untracked_site_is_never_notified() {
        let mut snapshot = june_lake_snapshot();
        for day in 13..=16 {
            snapshot.insert_day("099", format!("2024-06-{day}T00:00:00Z"), "Available");
        }
        let source =
            Arc::new(FakeSource::new().with_month("232268", date("2024-06-01"), snapshot));
        let sink = Arc::new(RecordingSink::default());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            single_pass(vec![range("2024-06-13", "2024-06-16")]),
        );

        executor.run(CancellationToken::new()).await.unwrap();

        let sites: Vec<_> = sink.alerts().into_iter().map(|a| a.site).collect();
        assert_eq!(sites, vec!["018".to_string()]);
        assert!(!executor.catalog().is_eligible("june_lake", "099"));
    }

    #[tokio::test]
    async fn test_pre_notified_site_is_skipped() {
        let source = Arc::new(
            FakeSource::new().with_month("232268", date("2024-06-01"), june_lake_snapshot()),
        );
        let sink = Arc::new(RecordingSink::default());
        let mut catalog = june_lake_catalog();
        catalog.mark_notified("june_lake", "018");
        let mut executor = executor(
            catalog,
            &source,
            &sink,
            single_pass(vec![range("2024-06-13", "2024-06-16")]),
        );

        let report = executor.sweep().await.unwrap();

        assert!(sink.alerts().is_empty());
        assert_eq!(report.sites_checked, 2);
        assert_eq!(report.ranges_checked, 1);
    }

    #[tokio::test]
    async fn test_campgrounds_and_ranges_follow_configuration_order() {
        let mut silver = AvailabilitySnapshot::new("232269");
        silver.insert_day("A1", "2024-06-13T00:00:00Z", "Available");
        let source = Arc::new(
            FakeSource::new()
                .with_month("232268", date("2024-06-01"), june_lake_snapshot())
                .with_month("232269", date("2024-06-01"), silver),
        );
        let sink = Arc::new(RecordingSink::default());
        let catalog = SiteCatalog::from_entries([
            TrackedCampground::new("silver_lake", "232269", ["A1"]),
            TrackedCampground::new("june_lake", "232268", ["005", "018", "T004"]),
        ]);
        let mut executor = executor(
            catalog,
            &source,
            &sink,
            single_pass(vec![
                range("2024-06-13", "2024-06-13"),
                range("2024-06-14", "2024-06-16"),
            ]),
        );

        executor.sweep().await.unwrap();

        let alerts: Vec<_> = sink
            .alerts()
            .into_iter()
            .map(|a| (a.campground, a.site))
            .collect();
        assert_eq!(
            alerts,
            vec![
                ("silver_lake".to_string(), "A1".to_string()),
                ("june_lake".to_string(), "005".to_string()),
                ("june_lake".to_string(), "018".to_string()),
                ("june_lake".to_string(), "T004".to_string()),
            ]
        );
        let fetched: Vec<_> = source.calls().into_iter().map(|(id, _)| id).collect();
        assert_eq!(fetched, vec!["232269", "232269", "232268", "232268"]);
    }

    #[tokio::test]
    async fn test_start_month_policy_misses_later_month_days() {
        let mut june = AvailabilitySnapshot::new("232268");
        june.insert_day("018", "2024-06-29T00:00:00Z", "Available");
        june.insert_day("018", "2024-06-30T00:00:00Z", "Available");
        let mut july = AvailabilitySnapshot::new("232268");
        july.insert_day("018", "2024-07-01T00:00:00Z", "Available");

        let source = Arc::new(
            FakeSource::new()
                .with_month("232268", date("2024-06-01"), june)
                .with_month("232268", date("2024-07-01"), july),
        );
        let sink = Arc::new(RecordingSink::default());
        let catalog =
            SiteCatalog::from_entries([TrackedCampground::new("june_lake", "232268", ["018"])]);
        let mut executor = executor(
            catalog,
            &source,
            &sink,
            single_pass(vec![range("2024-06-29", "2024-07-01")]),
        );

        executor.sweep().await.unwrap();

        assert!(sink.alerts().is_empty());
        assert_eq!(source.calls(), vec![("232268".to_string(), date("2024-06-01"))]);
    }

    #[tokio::test]
    async fn test_all_months_policy_merges_months() {
        let mut june = AvailabilitySnapshot::new("232268");
        june.insert_day("018", "2024-06-29T00:00:00Z", "Available");
        june.insert_day("018", "2024-06-30T00:00:00Z", "Available");
        let mut july = AvailabilitySnapshot::new("232268");
        july.insert_day("018", "2024-07-01T00:00:00Z", "Available");

        let source = Arc::new(
            FakeSource::new()
                .with_month("232268", date("2024-06-01"), june)
                .with_month("232268", date("2024-07-01"), july),
        );
        let sink = Arc::new(RecordingSink::default());
        let catalog =
            SiteCatalog::from_entries([TrackedCampground::new("june_lake", "232268", ["018"])]);
        let config = ScanExecutorConfig {
            month_coverage: MonthCoverage::AllMonths,
            ..single_pass(vec![range("2024-06-29", "2024-07-01")])
        };
        let mut executor = executor(catalog, &source, &sink, config);

        executor.sweep().await.unwrap();

        assert_eq!(sink.alerts().len(), 1);
        assert_eq!(
            source.calls(),
            vec![
                ("232268".to_string(), date("2024-06-01")),
                ("232268".to_string(), date("2024-07-01")),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_ends_run() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(RecordingSink::default());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            single_pass(vec![range("2024-06-13", "2024-06-16")]),
        );

        let result = executor.run(CancellationToken::new()).await;

        assert!(matches!(result, Err(ScanError::RecGov(_))));
        assert!(sink.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_site_eligible() {
        let source = Arc::new(
            FakeSource::new().with_month("232268", date("2024-06-01"), june_lake_snapshot()),
        );
        let sink = Arc::new(RecordingSink::failing());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            single_pass(vec![range("2024-06-13", "2024-06-16")]),
        );

        let result = executor.run(CancellationToken::new()).await;

        assert!(matches!(result, Err(ScanError::Notification(_))));
        assert!(executor.catalog().is_eligible("june_lake", "018"));
    }

    #[tokio::test]
    async fn test_continuous_run_stops_when_cancelled() {
        let cancel = CancellationToken::new();
        let source = Arc::new(
            FakeSource::new()
                .with_month("232268", date("2024-06-01"), june_lake_snapshot())
                .cancel_on_call(2, cancel.clone()),
        );
        let sink = Arc::new(RecordingSink::default());
        let config = ScanExecutorConfig {
            date_ranges: vec![range("2024-06-13", "2024-06-16")],
            poll_interval: Duration::from_millis(1),
            ..ScanExecutorConfig::default()
        };
        let mut executor = executor(june_lake_catalog(), &source, &sink, config);

        let sweeps = executor.run(cancel).await.unwrap();

        assert_eq!(sweeps, 2);
        assert_eq!(source.calls().len(), 2);
        assert_eq!(sink.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_does_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(RecordingSink::default());
        let mut executor = executor(
            june_lake_catalog(),
            &source,
            &sink,
            ScanExecutorConfig::default(),
        );

        assert_eq!(executor.run(cancel).await.unwrap(), 0);
        assert!(source.calls().is_empty());
    }
}
