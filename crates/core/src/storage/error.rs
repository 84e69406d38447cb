//! Upload error types.

use serde_json::Value;
use thiserror::Error;

use crate::provider::TransportError;

/// A single file could not be written. Scoped to that file.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The provider refused the write.
    #[error("upload of '{path}' rejected with status {status}")]
    Rejected {
        /// Target path.
        path: String,
        /// HTTP status returned.
        status: u16,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// The provider accepted the write but the reply is unusable.
    #[error("upload of '{path}' returned no canonical path")]
    Malformed {
        /// Target path.
        path: String,
        /// Provider payload, verbatim.
        details: Value,
    },

    /// Network failure or timeout.
    #[error("upload of '{path}' failed: {source}")]
    Transport {
        /// Target path.
        path: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl UploadError {
    /// Provider payload to surface in the file outcome.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Rejected { details, .. } | Self::Malformed { details, .. } => details.clone(),
            Self::Transport { source, .. } => Value::String(source.to_string()),
        }
    }

    /// The path the write targeted.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Rejected { path, .. }
            | Self::Malformed { path, .. }
            | Self::Transport { path, .. } => path,
        }
    }
}
