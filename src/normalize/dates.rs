//! Date parsing and formatting for record columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;

/// Column format for dates
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Column format for processing timestamps
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Timestamps with an explicit offset, tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Timestamps without an offset
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Render an ISO-8601 timestamp as `MM/DD/YYYY`.
///
/// The date is taken in the timestamp's own offset; no timezone conversion is
/// applied. Absent or blank input yields `None`. Malformed input also yields
/// `None` and logs a warning, so a bad date empties the column without
/// dropping the record.
#[must_use]
pub fn parse_date(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match parse_iso_date(value) {
        Some(date) => Some(date.format(DISPLAY_DATE_FORMAT).to_string()),
        None => {
            warn!("Unrecognised date {value:?}, leaving column empty");
            None
        }
    }
}

/// Parse the calendar date of an ISO-8601 timestamp or date
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    // A trailing `Z` is the UTC offset
    let normalized = match value.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(timestamp.date_naive());
    }

    for format in OFFSET_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(&normalized, format) {
            return Some(timestamp.date_naive());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp.date());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Render a processing timestamp as `MM/DD/YYYY HH:MM:SS`
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}
