//! Error types shared by the backends and the session

use thiserror::Error;

/// Failure of a single backend request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("{0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP error! status: {status}, body: {body}")]
    Server { status: u16, body: String },

    /// 2xx response whose body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A navigable location that cannot be interpreted
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("invalid location '{href}': {source}")]
    Parse {
        href: String,
        #[source]
        source: url::ParseError,
    },
}
