//! Transport error types.

use thiserror::Error;

/// A provider call that never produced an HTTP response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The call exceeded the configured timeout.
    #[error("provider request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS or body streaming failure.
    #[error("provider request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Create a request error.
    #[must_use]
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
