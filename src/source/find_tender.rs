//! Find a Tender release package client.

use std::time::Instant;

use chrono::Local;
use log::error;
use reqwest::blocking::Client;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::schema::{RecordType, ReleasePackage};
use crate::source::{FetchWindow, ReleaseSource};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Longest error body kept in a [`FetchError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Blocking client for the OCDS release package endpoint
#[derive(Debug, Clone)]
pub struct FindTenderClient {
    http: Client,
    config: FetchConfig,
}

impl FindTenderClient {
    /// Create a client with the configured timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tender-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Query parameters for one fetch
    #[must_use]
    pub fn query_params(
        &self,
        record_type: RecordType,
        window: &FetchWindow,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("updatedFrom", window.from_param()),
            ("updatedTo", window.to_param()),
            ("stages", record_type.stage().to_string()),
            ("limit", self.config.limit.to_string()),
        ]
    }

    /// Fetch one window of releases.
    ///
    /// No pagination is done; the API returns at most `limit` releases.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or a body
    /// that is not a release package.
    pub fn fetch_window(
        &self,
        record_type: RecordType,
        window: &FetchWindow,
    ) -> Result<ReleasePackage, FetchError> {
        let response = self
            .http
            .get(&self.config.api_url)
            .query(&self.query_params(record_type, window))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl ReleaseSource for FindTenderClient {
    fn fetch(&self, record_type: RecordType) -> Option<ReleasePackage> {
        let window = FetchWindow::last_24_hours(Local::now().naive_local());
        let stage = record_type.stage();
        log_operation_start(
            "Fetching",
            &format!("{stage} data from {} to {}", window.from_param(), window.to_param()),
        );

        let start = Instant::now();
        match self.fetch_window(record_type, &window) {
            Ok(package) => {
                log_operation_complete("fetched", stage, package.len(), Some(start.elapsed()));
                Some(package)
            }
            Err(err) => {
                error!("Error fetching {stage} data from API: {err}");
                None
            }
        }
    }
}
