//! Release sources
//!
//! A source answers a time-windowed query for one record type. Failures never
//! reach the caller: a source that cannot deliver returns `None` and the run
//! treats that as "nothing to sync this time".

pub mod find_tender;

use chrono::{Duration, NaiveDateTime};

use crate::schema::{RecordType, ReleasePackage};

pub use find_tender::FindTenderClient;

/// Query timestamp format: second precision, no offset
pub const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Length of the default fetch window
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Something that can hand out release packages
pub trait ReleaseSource {
    /// Fetch the releases of one record type, or `None` when unavailable
    fn fetch(&self, record_type: RecordType) -> Option<ReleasePackage>;
}

/// Time window of a fetch, in local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl FetchWindow {
    /// The `hours` leading up to `end`
    #[must_use]
    pub fn ending_at(end: NaiveDateTime, hours: i64) -> Self {
        Self {
            from: end - Duration::hours(hours),
            to: end,
        }
    }

    /// The last 24 hours leading up to `end`
    #[must_use]
    pub fn last_24_hours(end: NaiveDateTime) -> Self {
        Self::ending_at(end, DEFAULT_WINDOW_HOURS)
    }

    #[must_use]
    pub fn from_param(&self) -> String {
        self.from.format(WINDOW_FORMAT).to_string()
    }

    #[must_use]
    pub fn to_param(&self) -> String {
        self.to.format(WINDOW_FORMAT).to_string()
    }
}
