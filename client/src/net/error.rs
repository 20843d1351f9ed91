//! Client error taxonomy.
//!
//! Only [`ClientError::Api`] is "typed": it carries the HTTP status and the
//! backend's structured [`ErrorResponse`]. Every other variant is surfaced to
//! users as a generic communication failure.

use std::time::Duration;

use contract::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response whose body parsed as an [`ErrorResponse`].
    #[error("api error: status {status}")]
    Api { status: u16, body: ErrorResponse },

    /// No response was obtained (DNS, connect, reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// A response arrived but its body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The caller's deadline passed before a response arrived.
    #[error("no response within {0:?}")]
    DeadlineElapsed(Duration),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ClientError {
    /// Status and structured body for the typed case.
    #[must_use]
    pub fn api_error(&self) -> Option<(u16, &ErrorResponse)> {
        match self {
            Self::Api { status, body } => Some((*status, body)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
