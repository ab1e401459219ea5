//! [`Error`][core::error::Error] types used across the crate

use core::time::Duration;

use thiserror::Error;

use crate::constants::NO_RESULT;

#[cfg(feature = "reqwest")]
pub mod api;
#[cfg(feature = "reqwest")]
pub use api::ApiError;

/// Failures signalled by, or inferred from, the content of the analysis stream
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The server sent an `error` event, carries its message
    #[error("{0}")]
    Server(String),
    /// The stream ended cleanly without a `result` event
    #[error("{}", NO_RESULT)]
    NoResult,
    /// A `data:` line was not valid JSON
    #[error("malformed event payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

/// Everything that can end an analysis run early, generic over the byte stream's error
#[derive(Debug, Error)]
pub enum AnalysisError<E> {
    /// Non-2xx response, the body was never read
    #[error("Analysis failed: {status}")]
    Status { status: u16 },
    /// Something went wrong with the underlying stream or connection
    #[error("{0}")]
    Transport(E),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// No chunk arrived within the configured idle window
    #[error("no data received for {0:?}")]
    Timeout(Duration),
}

impl<E> AnalysisError<E> {
    /// The server's message when the stream carried an `error` event
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AnalysisError::Protocol(ProtocolError::Server(message)) => Some(message),
            _ => None,
        }
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, AnalysisError::Protocol(ProtocolError::NoResult))
    }
}

/// Identity provider failures
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("identity provider error: {0}")]
    Provider(String),
}
