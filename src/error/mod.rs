//! Error types for the sync cycle.
//!
//! Each stage of the cycle has its own error type so the orchestrator can
//! recover from fetch, extraction and store failures at item granularity.
//! Only [`ConfigError`] and logging setup failures are fatal.

use std::io;

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing or blank
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors raised by the notice API client
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, timeout or client construction failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not a release package
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while normalizing a single release
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The release carries no `ocid`
    #[error("release {release_id} has no ocid")]
    MissingOcid { release_id: String },

    /// The release does not have the expected nested structure
    #[error("malformed release: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised by a store table
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No table is configured for the record type
    #[error("{0} table not configured")]
    TableNotConfigured(&'static str),

    /// The table URL could not be built
    #[error("invalid table URL: {0}")]
    InvalidUrl(String),

    /// Connection or timeout failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The store answered with an unexpected body
    #[error("malformed store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("logging setup failed: {0}")]
    Logging(#[from] log::SetLoggerError),
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
