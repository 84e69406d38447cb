//! Credential exchange errors.

use serde_json::Value;
use thiserror::Error;

use crate::provider::TransportError;

/// The refresh grant could not be turned into an access credential.
///
/// Always terminal for the whole batch.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token endpoint answered with a non-success status.
    #[error("token endpoint rejected the refresh grant (HTTP {status})")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Success status but no usable `access_token`.
    #[error("token response is missing access_token")]
    MissingToken {
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Token endpoint unreachable.
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] TransportError),
}

impl AuthError {
    /// Provider payload for diagnostics.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Rejected { details, .. } | Self::MissingToken { details } => details.clone(),
            Self::Transport(err) => Value::String(err.to_string()),
        }
    }
}

impl From<AuthError> for linkdrop_shared::AppError {
    fn from(err: AuthError) -> Self {
        Self::ProviderAuth {
            message: err.to_string(),
            details: err.details(),
        }
    }
}
