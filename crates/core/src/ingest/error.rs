//! Ingestion error types.

use std::convert::Infallible;

use linkdrop_shared::AppError;
use thiserror::Error;

/// Request rejected during ingestion. Raised before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing or empty file list.
    #[error("no files provided")]
    NoFiles,

    /// More files than the batch allows.
    #[error("too many files: {count} exceeds maximum {max}")]
    TooManyFiles {
        /// Files received (at least).
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// File name is empty or a path traversal.
    #[error("file '{file}' has an invalid name")]
    BadName {
        /// The offending file name.
        file: String,
    },

    /// Extension not on the allow-list.
    #[error("file '{file}' has a disallowed extension")]
    BadExtension {
        /// The offending file name.
        file: String,
    },

    /// MIME type not on the allow-list.
    #[error("file '{file}' has disallowed MIME type '{mime_type}'")]
    BadMime {
        /// The offending file name.
        file: String,
        /// The declared MIME type.
        mime_type: String,
    },

    /// File exceeds the size ceiling.
    #[error("file '{file}' is {size} bytes or more, maximum allowed is {max} bytes")]
    FileTooLarge {
        /// The offending file name.
        file: String,
        /// Declared or observed size at rejection.
        size: u64,
        /// Maximum allowed.
        max: u64,
    },

    /// Payload is not valid base64.
    #[error("file '{file}' has invalid base64 data: {message}")]
    BadEncoding {
        /// The offending file name.
        file: String,
        /// Decoder message.
        message: String,
    },

    /// Whole body exceeds the request ceiling.
    #[error("request body exceeds {max} bytes")]
    BodyTooLarge {
        /// Maximum allowed.
        max: usize,
    },

    /// Body could not be parsed.
    #[error("malformed request body: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Create a malformed body error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(file: impl Into<String>, size: u64, max: u64) -> Self {
        Self::FileTooLarge {
            file: file.into(),
            size,
            max,
        }
    }

    /// Machine-readable name of the violated constraint.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoFiles => "no_files",
            Self::TooManyFiles { .. } => "too_many_files",
            Self::BadName { .. } => "bad_name",
            Self::BadExtension { .. } => "bad_extension",
            Self::BadMime { .. } => "bad_mime",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::BadEncoding { .. } => "bad_encoding",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::Malformed(_) => "malformed_body",
        }
    }

    /// The file the violation is tied to, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::BadName { file }
            | Self::BadExtension { file }
            | Self::BadMime { file, .. }
            | Self::FileTooLarge { file, .. }
            | Self::BadEncoding { file, .. } => Some(file),
            Self::NoFiles
            | Self::TooManyFiles { .. }
            | Self::BodyTooLarge { .. }
            | Self::Malformed(_) => None,
        }
    }
}

impl From<Infallible> for ValidationError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(
            err.reason(),
            err.to_string(),
            err.file().map(str::to_string),
        )
    }
}
