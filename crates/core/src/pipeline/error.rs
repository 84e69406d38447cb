//! Pipeline error types.

use linkdrop_shared::AppError;
use serde_json::Value;
use thiserror::Error;

use crate::credential::AuthError;
use crate::link::LinkError;
use crate::storage::UploadError;

/// A failure scoped to one file. Recorded in that file's outcome.
#[derive(Debug, Clone, Error)]
pub enum FileError {
    /// Write failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// No link could be obtained.
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl FileError {
    /// Stage that failed.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Link(_) => "link",
        }
    }

    /// Provider payload, verbatim.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Upload(err) => err.details(),
            Self::Link(err) => err.details(),
        }
    }
}

/// A failure that aborts the whole batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No access credential could be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Auth(err) => err.into(),
        }
    }
}
