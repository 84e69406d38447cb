//! Client construction errors.

use thiserror::Error;

/// The HTTP client could not be built.
#[derive(Debug, Error)]
pub enum DropboxError {
    /// TLS backend or client builder failure.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
