//! Logging setup and helpers
//!
//! Log lines go through the `log` facade. The binaries install `env_logger`
//! with [`init_logging`], which writes every line both to stdout and to a
//! daily log file. The file is reopened when the local date changes, so a
//! long-running scheduler gets one file per day.

pub mod daily;
pub mod log;
pub mod tee;

use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use env_logger::{Builder, Env, Target};

use crate::config::LoggingConfig;
use crate::error::Result;

pub use self::log::{log_operation_complete, log_operation_start, log_warning};
pub use daily::DailyFile;
pub use tee::TeeWriter;

/// Timestamp format of a log line
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path of the log file for a given day
#[must_use]
pub fn log_file_path(config: &LoggingConfig, day: NaiveDate) -> PathBuf {
    config
        .directory
        .join(format!("{}_{}.log", config.file_prefix, day.format("%Y%m%d")))
}

/// Install the global logger.
///
/// The default level is `info`; `RUST_LOG` overrides it. The log directory
/// is created if missing.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a logger is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<PathBuf> {
    let file = DailyFile::open(config.clone(), Local::now().date_naive())?;
    let path = file.path();

    Builder::from_env(Env::default().default_filter_or(config.default_level.as_str()))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format(LOG_TIMESTAMP_FORMAT),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(TeeWriter::new(file))))
        .try_init()?;

    Ok(path)
}
