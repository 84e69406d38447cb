//! Ingestion types.

use bytes::Bytes;
use serde::Deserialize;

/// Naming metadata attached to a file, already sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    /// Order identifier used as a path segment.
    pub order_id: Option<String>,
}

/// A validated file ready for upload.
///
/// Only [`MultipartIngester`](super::MultipartIngester) creates these; the
/// fields are read-only afterwards.
#[derive(Debug, Clone)]
pub struct FileUploadRequest {
    name: String,
    mime_type: String,
    payload: Bytes,
    metadata: FileMetadata,
}

impl FileUploadRequest {
    pub(crate) fn new(
        name: String,
        mime_type: String,
        payload: Bytes,
        metadata: FileMetadata,
    ) -> Self {
        Self {
            name,
            mime_type,
            payload,
            metadata,
        }
    }

    /// Name as supplied by the client.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        u64::try_from(self.payload.len()).unwrap_or(u64::MAX)
    }

    /// Raw payload. Cloning is cheap.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Sanitized naming metadata.
    #[must_use]
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }
}

/// JSON request body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEnvelope {
    /// Files to upload.
    #[serde(default)]
    pub files: Option<Vec<EnvelopeFile>>,
    /// Batch-wide order identifier.
    #[serde(default, alias = "orderId")]
    pub order_id: Option<String>,
}

/// One file inside the JSON envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeFile {
    /// Client file name.
    pub name: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 payload, optionally as a `data:` URL.
    pub data: String,
    /// Declared size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Per-file order identifier, overrides the batch one.
    #[serde(default, alias = "orderId")]
    pub order_id: Option<String>,
}
