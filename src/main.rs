use anyhow::Context;
use log::{error, info};
use tender_sync::config::{LoggingConfig, SyncConfig};
use tender_sync::run_cycle;
use tender_sync::utils::logging::init_logging;

fn main() {
    if let Err(err) = run() {
        error!("Fatal error in main execution: {err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let log_path = init_logging(&LoggingConfig::from_env()).context("Failed to set up logging")?;
    info!("Starting daily tender extraction, logging to {}", log_path.display());

    let config = SyncConfig::from_env().context("Failed to load configuration")?;
    let summary = run_cycle(&config).context("Failed to run extraction cycle")?;

    info!(
        "Daily extraction completed. Total records processed: {}",
        summary.total_processed()
    );
    Ok(())
}
