//! Lookup error types

use serde::Serialize;
use thiserror::Error;

/// Failure of a single company lookup. Every variant is local to one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Empty or missing CIN; raised before any network call
    #[error("CIN is required")]
    MissingCin,

    /// No API key configured at request time
    #[error("InstaFinancials API key is not configured (set INSTA_API_KEY)")]
    MissingApiKey,

    /// Provider answered with a non-2xx status
    #[error("provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Provider did not answer within the client timeout
    #[error("request to provider timed out")]
    Timeout,

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Body was not JSON, or not a JSON object
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Error category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    Upstream,
    Network,
}

impl ErrorKind {
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Invalid input",
            ErrorKind::Configuration => "Configuration error",
            ErrorKind::Upstream => "Provider error",
            ErrorKind::Network => "Network error",
        }
    }
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::MissingCin => ErrorKind::Validation,
            LookupError::MissingApiKey => ErrorKind::Configuration,
            LookupError::Upstream { .. } | LookupError::InvalidResponse(_) => ErrorKind::Upstream,
            LookupError::Timeout | LookupError::Network(_) => ErrorKind::Network,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_decode() {
            LookupError::InvalidResponse(err.to_string())
        } else {
            LookupError::Network(err.to_string())
        }
    }
}
