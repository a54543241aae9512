//! Runs the extraction cycle every day at `DAILY_RUN_TIME`.
//!
//! A failed cycle is logged and the scheduler waits for the next day.

use anyhow::Context;
use chrono::Local;
use log::{error, info};
use tender_sync::config::{LoggingConfig, SyncConfig};
use tender_sync::run_cycle;
use tender_sync::schedule::{next_run_after, wait_until};
use tender_sync::utils::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::from_env()).context("Failed to set up logging")?;

    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Fatal error in scheduler: {err}");
            return Err(err).context("Failed to load configuration");
        }
    };
    let run_time = config.schedule.daily_run_time;
    info!(
        "Scheduler started. Daily extraction scheduled for {}",
        run_time.format("%H:%M")
    );

    loop {
        let next = next_run_after(Local::now().naive_local(), run_time);
        info!("Next extraction at {next}");
        wait_until(next);

        info!("Scheduled extraction starting...");
        match run_cycle(&config) {
            Ok(summary) => info!(
                "Scheduled extraction completed successfully ({} records processed)",
                summary.total_processed()
            ),
            Err(err) => error!("Scheduled extraction failed: {err}"),
        }
    }
}
