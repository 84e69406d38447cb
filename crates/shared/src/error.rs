//! Application-wide error types.

use serde_json::Value;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures surfaced to the caller as `{error, details}`.
///
/// Per-file upload and link failures are not represented here; they travel
/// inside the per-file outcome instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request rejected before any provider call.
    #[error("Validation error: {message}")]
    Validation {
        /// Machine-readable constraint name (e.g. `bad_mime`).
        reason: String,
        /// Human-readable description.
        message: String,
        /// Offending file, when the violation is tied to one.
        file: Option<String>,
    },

    /// HTTP method not supported on the route.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The storage provider refused the credential exchange.
    #[error("Provider authentication failed: {message}")]
    ProviderAuth {
        /// Human-readable description.
        message: String,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(
        reason: impl Into<String>,
        message: impl Into<String>,
        file: Option<String>,
    ) -> Self {
        Self::Validation {
            reason: reason.into(),
            message: message.into(),
            file,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::MethodNotAllowed(_) => 405,
            Self::ProviderAuth { .. } => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Validation { reason, .. } => reason,
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::ProviderAuth { .. } => "provider_auth_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the `details` payload for API responses.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Validation { message, file, .. } => {
                serde_json::json!({ "message": message, "file": file })
            }
            Self::ProviderAuth { details, .. } => details.clone(),
            Self::MethodNotAllowed(msg) | Self::Internal(msg) => Value::String(msg.clone()),
        }
    }
}
