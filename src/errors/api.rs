use thiserror::Error;

use super::AnalysisError;

/// Errors from [`EarningsClient`][crate::api::EarningsClient] REST calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx status outside the soft cases a call documents
    #[error("{context}: {status}")]
    Status { status: u16, context: &'static str },
    /// Response body did not match the expected shape, includes the JSON path
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("ticker must not be empty")]
    InvalidTicker,
    #[error(transparent)]
    Analysis(#[from] AnalysisError<reqwest::Error>),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::Analysis(AnalysisError::Status { status }) => Some(*status),
            _ => None,
        }
    }
}
