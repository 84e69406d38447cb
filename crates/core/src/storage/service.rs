//! Storage uploader implementation.

use std::sync::Arc;

use tracing::{info, warn};

use super::error::UploadError;
use crate::credential::AccessCredential;
use crate::ingest::FileUploadRequest;
use crate::provider::{ProviderTransport, UploadArg};

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectRecord {
    /// Provider object identifier.
    pub id: String,
    /// Lowercased, provider-normalized path. Links are requested against this.
    pub canonical_path: String,
    /// Path with the caller's casing.
    pub display_path: String,
}

/// Writes files to the remote store.
pub struct StorageUploader<P: ProviderTransport> {
    transport: Arc<P>,
}

impl<P: ProviderTransport> StorageUploader<P> {
    /// Create an uploader over `transport`.
    #[must_use]
    pub fn new(transport: Arc<P>) -> Self {
        Self { transport }
    }

    /// Upload `file` to `path`.
    ///
    /// The payload is sent untouched. The provider may rename on conflict;
    /// the returned record carries the path it actually chose.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected, the reply lacks
    /// `path_lower`, or the transport fails.
    pub async fn upload(
        &self,
        credential: &AccessCredential,
        path: &str,
        file: &FileUploadRequest,
    ) -> Result<RemoteObjectRecord, UploadError> {
        let reply = self
            .transport
            .upload(credential, &UploadArg::add(path), file.payload().clone())
            .await
            .map_err(|source| UploadError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !reply.is_success() || reply.error_summary().is_some() {
            warn!(path = %path, status = reply.status, "Upload rejected");
            return Err(UploadError::Rejected {
                path: path.to_string(),
                status: reply.status,
                details: reply.body,
            });
        }

        let Some(canonical_path) = reply.str_field("path_lower").filter(|p| !p.is_empty()) else {
            return Err(UploadError::Malformed {
                path: path.to_string(),
                details: reply.body,
            });
        };

        let record = RemoteObjectRecord {
            id: reply.str_field("id").unwrap_or_default().to_string(),
            canonical_path: canonical_path.to_string(),
            display_path: reply
                .str_field("path_display")
                .unwrap_or(canonical_path)
                .to_string(),
        };

        info!(
            file = %file.name(),
            path = %record.canonical_path,
            size = file.size_bytes(),
            "File stored"
        );
        Ok(record)
    }
}
