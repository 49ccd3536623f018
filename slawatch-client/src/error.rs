//! Error types for the metrics client.

use thiserror::Error;

/// Errors that can occur when talking to the monitoring API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A credential or application selection needed by the call is missing.
    ///
    /// Always raised before any request is sent.
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// The batch would need more requests than the safety ceiling allows.
    ///
    /// The whole operation is abandoned without sending anything.
    #[error("Refusing to issue {steps} requests in one batch (limit {limit})")]
    RateLimitAvoidance { steps: u64, limit: u64 },

    /// The requested range cannot be fetched.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The API rejected the key.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// Whether the error means the session lacks credentials or an app.
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, ClientError::AuthenticationRequired(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<slawatch_types::RangeError> for ClientError {
    fn from(err: slawatch_types::RangeError) -> Self {
        ClientError::InvalidRange(err.to_string())
    }
}
