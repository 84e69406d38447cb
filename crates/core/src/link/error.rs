//! Link error types.

use serde_json::Value;
use thiserror::Error;

use crate::provider::TransportError;

/// No usable link could be obtained for a stored object.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// Link creation failed for a reason other than an existing link.
    #[error("link creation for '{path}' rejected with status {status}")]
    CreateRejected {
        /// Canonical path.
        path: String,
        /// HTTP status returned.
        status: u16,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Link creation succeeded without a URL.
    #[error("link creation for '{path}' returned no url")]
    MissingUrl {
        /// Canonical path.
        path: String,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Listing existing links failed.
    #[error("listing links for '{path}' rejected with status {status}")]
    ListRejected {
        /// Canonical path.
        path: String,
        /// HTTP status returned.
        status: u16,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// The listing held no entry with a URL.
    #[error("no existing link found for '{path}'")]
    NoListedLink {
        /// Canonical path.
        path: String,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// The provider returned something that is not a URL.
    #[error("invalid link url '{url}': {message}")]
    InvalidUrl {
        /// Canonical path.
        path: String,
        /// The offending value.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Network failure or timeout.
    #[error("link request for '{path}' failed: {source}")]
    Transport {
        /// Canonical path.
        path: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl LinkError {
    /// Provider payload to surface in the file outcome.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::CreateRejected { details, .. }
            | Self::MissingUrl { details, .. }
            | Self::ListRejected { details, .. }
            | Self::NoListedLink { details, .. } => details.clone(),
            Self::InvalidUrl { url, .. } => Value::String(url.clone()),
            Self::Transport { source, .. } => Value::String(source.to_string()),
        }
    }
}
