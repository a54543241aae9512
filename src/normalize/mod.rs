//! Normalization of OCDS releases into flat records
//!
//! Everything in this module is pure: no I/O and no shared state. Each
//! release is decoded and normalized on its own, and a release that fails is
//! logged and skipped without affecting the rest of the batch.

pub mod cpv;
pub mod dates;
pub mod extract;

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractError;
use crate::schema::{FlatRecord, PipelineRecord, Release, ReleasePackage, TenderRecord};

pub use cpv::extract_cpv_info;
pub use dates::parse_date;
pub use extract::{extract_pipeline_record, extract_tender_record};

/// A record type that can be built from a single release
pub trait Normalize: FlatRecord + Sized {
    /// Build the record. `processed_at` is the local time of the run.
    fn normalize(release: &Release, processed_at: NaiveDateTime) -> Result<Self, ExtractError>;
}

impl Normalize for TenderRecord {
    fn normalize(release: &Release, _processed_at: NaiveDateTime) -> Result<Self, ExtractError> {
        extract_tender_record(release)
    }
}

impl Normalize for PipelineRecord {
    fn normalize(release: &Release, processed_at: NaiveDateTime) -> Result<Self, ExtractError> {
        extract_pipeline_record(release, processed_at)
    }
}

/// Records produced from one release package
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome<R> {
    pub records: Vec<R>,
    /// Releases dropped because they could not be normalized
    pub skipped: usize,
}

impl<R> Default for ProcessOutcome<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Normalize every release of a package, stamping the current local time.
///
/// An absent or empty package yields no records.
#[must_use]
pub fn process_releases<R: Normalize>(package: Option<&ReleasePackage>) -> ProcessOutcome<R> {
    process_releases_at(package, Local::now().naive_local())
}

/// Normalize every release of a package with a fixed processing time
#[must_use]
pub fn process_releases_at<R: Normalize>(
    package: Option<&ReleasePackage>,
    processed_at: NaiveDateTime,
) -> ProcessOutcome<R> {
    let Some(package) = package.filter(|package| !package.is_empty()) else {
        return ProcessOutcome::default();
    };

    info!("Processing {} {} releases", package.len(), R::RECORD_TYPE);

    let mut outcome = ProcessOutcome {
        records: Vec::with_capacity(package.len()),
        skipped: 0,
    };
    for raw in &package.releases {
        match normalize_release::<R>(raw, processed_at) {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                warn!(
                    "Skipping {} release {}: {err}",
                    R::RECORD_TYPE,
                    raw_release_id(raw)
                );
                outcome.skipped += 1;
            }
        }
    }

    outcome
}

fn normalize_release<R: Normalize>(
    raw: &Value,
    processed_at: NaiveDateTime,
) -> Result<R, ExtractError> {
    let release = Release::deserialize(raw)?;
    R::normalize(&release, processed_at)
}

fn raw_release_id(raw: &Value) -> &str {
    raw.get("id").and_then(Value::as_str).unwrap_or("unknown")
}
