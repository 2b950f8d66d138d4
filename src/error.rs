//! Error types shared across the crate

use std::time::Duration;

use thiserror::Error;

/// Rejection of a product identifier before any retailer is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("product number is empty")]
    Empty,

    #[error("product number is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("invalid product number format: \"{0}\"")]
    InvalidFormat(String),
}

/// Why a single retailer produced no product. Always scoped to that retailer;
/// never aborts the rest of a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("HTTP {0}")]
    HttpError(u16),

    #[error("could not parse response: {0}")]
    ParseError(String),

    #[error("request failed: {0}")]
    Network(String),
}

impl FailureReason {
    /// Classifies a transport error, folding reqwest's own timeouts into
    /// [`FailureReason::Timeout`].
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpError(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Problems building a retailer from its definition.
#[derive(Debug, Error)]
pub enum RetailerError {
    #[error("invalid {field} selector for {retailer}: {reason}")]
    InvalidSelector {
        retailer: String,
        field: &'static str,
        reason: String,
    },

    #[error("unknown retailer \"{0}\"")]
    UnknownRetailer(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Invalid or missing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("no retailers enabled")]
    NoRetailers,
}
