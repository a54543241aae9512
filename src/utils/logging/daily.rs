//! Log file that follows the calendar day.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use super::log_file_path;
use crate::config::LoggingConfig;

/// Appends to `<prefix>_YYYYMMDD.log`, switching files when the local date changes
#[derive(Debug)]
pub struct DailyFile {
    config: LoggingConfig,
    day: NaiveDate,
    file: File,
}

impl DailyFile {
    /// Open (or create) the file for `day`, creating the log directory if missing
    pub fn open(config: LoggingConfig, day: NaiveDate) -> io::Result<Self> {
        let file = open_append(&log_file_path(&config, day))?;
        Ok(Self { config, day, file })
    }

    /// Path of the file currently written to
    #[must_use]
    pub fn path(&self) -> PathBuf {
        log_file_path(&self.config, self.day)
    }

    /// Switch to the file for `day` unless it is already open
    pub fn roll_to(&mut self, day: NaiveDate) -> io::Result<()> {
        if day != self.day {
            self.file.flush()?;
            self.file = open_append(&log_file_path(&self.config, day))?;
            self.day = day;
        }
        Ok(())
    }

    fn write_on(&mut self, day: NaiveDate, buf: &[u8]) -> io::Result<usize> {
        self.roll_to(day)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }
}

impl Write for DailyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_on(Local::now().date_naive(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
