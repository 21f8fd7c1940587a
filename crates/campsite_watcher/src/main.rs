//! Main entry point for the campsite watcher.
//! Builds the site catalog for the configured campgrounds and polls recreation.gov
//! until interrupted, or once with `--once`.

mod cli;

use std::sync::Arc;

use campground_scan::{ScanExecutor, SiteCatalog};
use clap::Parser;
use notification_services::NtfyNotifier;
use rec_gov::{AvailabilitySource, RecGovClient};
use tokio_util::sync::CancellationToken;

use crate::cli::Args;

async fn run(args: Args) -> anyhow::Result<()> {
    let source: Arc<dyn AvailabilitySource> =
        Arc::new(RecGovClient::with_base_url(args.rec_gov_url.as_str())?);
    let notifier = Arc::new(NtfyNotifier::new(
        args.ntfy_url.as_str(),
        args.ntfy_topic.as_str(),
    )?);
    log::info!("📣 Alerts will be published to {}", notifier.topic_url());

    let today = chrono::Local::now().date_naive();
    let catalog = SiteCatalog::build(source.as_ref(), &args.campgrounds, today).await?;
    log::info!(
        "🗺️ Site catalog built: {} sites across {} campgrounds",
        catalog.tracked_count(),
        catalog.campgrounds().len()
    );

    let mut executor = ScanExecutor::new(catalog, source, notifier, args.executor_config());

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("🛑 Shutdown requested");
            shutdown.cancel();
        }
    });

    let sweeps = executor.run(cancel).await?;
    log::info!(
        "✅ Stopped after {} sweeps, {} sites notified",
        sweeps,
        executor.catalog().tracked_count() - executor.catalog().eligible_count()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(args.default_log_filter()));

    log::info!("🏕️ Starting campsite watcher...");
    log::debug!("Started with args: {:?}", args);

    run(args).await.inspect_err(|e| log::error!("❌ Campsite watcher failed: {}", e))
}
