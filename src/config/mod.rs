//! Configuration for the sync cycle.
//!
//! Values come from environment variables. Every loader takes a lookup
//! function so that configuration can be built without touching the process
//! environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;

use crate::error::ConfigError;

/// Release package endpoint of the Find a Tender service
pub const DEFAULT_API_URL: &str = "https://www.find-tender.service.gov.uk/api/1.0/ocdsReleasePackages";

/// Airtable REST API root
pub const DEFAULT_AIRTABLE_URL: &str = "https://api.airtable.com/v0";

pub const DEFAULT_FETCH_LIMIT: u32 = 100;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DAILY_RUN_TIME: &str = "17:00";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const ACCESS_TOKEN_VAR: &str = "AIRTABLE_ACCESS_TOKEN";
pub const BASE_ID_VAR: &str = "AIRTABLE_BASE_ID";
pub const TENDER_TABLE_VAR: &str = "TENDER_TABLE_ID";
pub const PIPELINE_TABLE_VAR: &str = "PIPELINE_TABLE_ID";
pub const DAILY_RUN_TIME_VAR: &str = "DAILY_RUN_TIME";
pub const API_URL_VAR: &str = "TENDER_API_URL";
pub const FETCH_LIMIT_VAR: &str = "TENDER_FETCH_LIMIT";
pub const FETCH_TIMEOUT_VAR: &str = "TENDER_FETCH_TIMEOUT_SECS";
pub const LOG_DIR_VAR: &str = "TENDER_LOG_DIR";

/// Complete configuration of a sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub airtable: AirtableConfig,
    pub fetch: FetchConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            airtable: AirtableConfig::from_lookup(&lookup)?,
            fetch: FetchConfig::from_lookup(&lookup)?,
            schedule: ScheduleConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup),
        })
    }
}

/// Store credentials and table identifiers
#[derive(Clone)]
pub struct AirtableConfig {
    pub access_token: String,
    pub base_id: String,
    pub tender_table_id: String,
    /// Pipeline records fail to sync when this is unset
    pub pipeline_table_id: Option<String>,
    pub api_url: String,
}

impl AirtableConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_token: required(&lookup, ACCESS_TOKEN_VAR)?,
            base_id: required(&lookup, BASE_ID_VAR)?,
            tender_table_id: required(&lookup, TENDER_TABLE_VAR)?,
            pipeline_table_id: optional(&lookup, PIPELINE_TABLE_VAR),
            api_url: DEFAULT_AIRTABLE_URL.to_string(),
        })
    }
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_id: String::new(),
            tender_table_id: String::new(),
            pipeline_table_id: None,
            api_url: DEFAULT_AIRTABLE_URL.to_string(),
        }
    }
}

// Keeps the token out of log lines
impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("access_token", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("tender_table_id", &self.tender_table_id)
            .field("pipeline_table_id", &self.pipeline_table_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Notice API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub api_url: String,
    /// Upper bound on releases per request
    pub limit: u32,
    pub timeout: Duration,
}

impl FetchConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_url: optional(&lookup, API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            limit: parsed(&lookup, FETCH_LIMIT_VAR, DEFAULT_FETCH_LIMIT)?,
            timeout: Duration::from_secs(parsed(
                &lookup,
                FETCH_TIMEOUT_VAR,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
        })
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            limit: DEFAULT_FETCH_LIMIT,
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

/// Daily schedule, read only by the scheduler binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub daily_run_time: NaiveTime,
}

impl ScheduleConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = optional(&lookup, DAILY_RUN_TIME_VAR)
            .unwrap_or_else(|| DEFAULT_DAILY_RUN_TIME.to_string());
        Ok(Self {
            daily_run_time: parse_run_time(&raw)?,
        })
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_run_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    /// Daily files are named `<prefix>_YYYYMMDD.log`
    pub file_prefix: String,
    /// Filter used when `RUST_LOG` is unset
    pub default_level: String,
}

impl LoggingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            directory: optional(&lookup, LOG_DIR_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file_prefix: "tender_extract".to_string(),
            default_level: "info".to_string(),
        }
    }
}

/// Parse a `HH:MM` run time
pub fn parse_run_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ConfigError::Invalid {
        name: DAILY_RUN_TIME_VAR,
        reason: format!("expected HH:MM, got {value:?} ({e})"),
    })
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}
