use std::time::Duration;

use campground_scan::{Campground, DateRangeRequest, MonthCoverage, RunMode, ScanExecutorConfig};
use clap::Parser;
use notification_services::{DEFAULT_NTFY_TOPIC, DEFAULT_NTFY_URL};

/// Watches recreation.gov campgrounds and sends an ntfy alert when a site
/// opens up for a whole requested stay.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// campground to watch as LABEL=ID, e.g. june_lake=232268 (repeatable)
    #[arg(long = "campground", env = "CAMPGROUNDS", value_delimiter = ',', required = true)]
    pub(crate) campgrounds: Vec<Campground>,

    /// inclusive stay as START:END, e.g. 2024-06-13:2024-06-16 (repeatable)
    #[arg(long = "dates", env = "DATES", value_delimiter = ',', required = true)]
    pub(crate) date_ranges: Vec<DateRangeRequest>,

    /// base URL of the recreation.gov API
    #[arg(long, env, default_value = rec_gov::DEFAULT_BASE_URL)]
    pub(crate) rec_gov_url: String,

    /// base URL of the ntfy server
    #[arg(long, env, default_value = DEFAULT_NTFY_URL)]
    pub(crate) ntfy_url: String,

    /// ntfy topic alerts are published to
    #[arg(long, env, default_value = DEFAULT_NTFY_TOPIC)]
    pub(crate) ntfy_topic: String,

    /// seconds to sleep between sweeps
    #[arg(long, env, default_value_t = 60)]
    pub(crate) sleep_time: u64,

    /// sweep once and exit
    #[arg(long, env = "RUN_ONCE")]
    pub(crate) once: bool,

    /// also fetch later months when a stay crosses a month boundary
    #[arg(long, env)]
    pub(crate) span_months: bool,

    /// verbose diagnostics
    #[arg(long, env)]
    pub(crate) debug: bool,
}

impl Args {
    pub(crate) fn executor_config(&self) -> ScanExecutorConfig {
        ScanExecutorConfig {
            date_ranges: self.date_ranges.clone(),
            poll_interval: Duration::from_secs(self.sleep_time),
            run_mode: if self.once {
                RunMode::SinglePass
            } else {
                RunMode::Continuous
            },
            month_coverage: if self.span_months {
                MonthCoverage::AllMonths
            } else {
                MonthCoverage::StartMonth
            },
        }
    }

    /// Log filter used unless RUST_LOG is set
    pub(crate) fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "info,campsite_watcher=debug,campground_scan=debug,rec_gov=debug,notification_services=debug"
        } else {
            "info"
        }
    }
}
