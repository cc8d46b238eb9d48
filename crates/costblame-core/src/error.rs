//! Error types for cost-blame core.

use thiserror::Error;

/// Core error type for cost analysis operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed relative duration expression.
    #[error("invalid time window format: {0} (expected format: 48h, 7d, 30d)")]
    InvalidWindow(String),

    /// Grouping dimension the billing source does not recognize.
    #[error("unsupported group-by: {0} (expected one of: service, linked_account, region, usage_type)")]
    UnsupportedDimension(String),

    /// Query granularity other than DAILY or HOURLY.
    #[error("unsupported granularity: {0} (expected DAILY or HOURLY)")]
    InvalidGranularity(String),

    /// Billing query failed; no partial result is returned.
    #[error("cost query failed: {0}")]
    Query(String),

    /// Malformed billing export record.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Webhook delivery errors
    #[error("notification failed: {0}")]
    Notify(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Notify(err.to_string())
    }
}

/// Result type alias for cost analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
