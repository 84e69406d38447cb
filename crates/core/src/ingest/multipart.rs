//! Streaming `multipart/form-data` collection.

use bytes::Bytes;
use futures::Stream;

use super::error::ValidationError;
use super::service::MultipartIngester;
use super::types::{FileMetadata, FileUploadRequest};

/// Whether a text field carries the order identifier.
#[must_use]
pub fn is_order_field(field_name: &str) -> bool {
    matches!(field_name, "order_id" | "orderId" | "order")
}

struct PendingFile {
    name: String,
    mime_type: String,
    payload: Bytes,
}

/// Collects multipart fields in arrival order.
///
/// Text fields may arrive before or after the file parts; metadata is
/// attached when the batch is finished.
pub struct MultipartBatch<'a> {
    ingester: &'a MultipartIngester,
    pending: Vec<PendingFile>,
    order_id: Option<String>,
}

impl<'a> MultipartBatch<'a> {
    /// Start an empty batch.
    #[must_use]
    pub fn new(ingester: &'a MultipartIngester) -> Self {
        Self {
            ingester,
            pending: Vec::new(),
            order_id: None,
        }
    }

    /// Record an auxiliary text field. Unknown fields are ignored.
    pub fn add_text_field(&mut self, field_name: &str, value: &str) {
        if is_order_field(field_name) {
            self.order_id = self.ingester.sanitize_metadata(value);
        }
    }

    /// Validate and read one file part.
    ///
    /// The count, name, extension and MIME type are checked before the part
    /// body is touched; the body is then read with the size ceiling applied
    /// chunk by chunk.
    ///
    /// # Errors
    ///
    /// Returns the first violation; the caller should stop reading the body.
    pub async fn add_file_field<S, E>(
        &mut self,
        file_name: &str,
        content_type: Option<&str>,
        stream: S,
    ) -> Result<(), ValidationError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<ValidationError>,
    {
        let max = self.ingester.limits().max_files;
        if self.pending.len() >= max {
            return Err(ValidationError::TooManyFiles {
                count: self.pending.len() + 1,
                max,
            });
        }

        let mime_type = content_type.unwrap_or("application/octet-stream");
        self.ingester.check_declared(file_name, mime_type, None)?;

        let payload = self.ingester.read_bounded(file_name, stream).await?;
        self.pending.push(PendingFile {
            name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            payload,
        });
        Ok(())
    }

    /// Number of file parts accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no file part has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Produce the validated records.
    ///
    /// # Errors
    ///
    /// Returns `NoFiles` if no file part was received.
    pub fn finish(self) -> Result<Vec<FileUploadRequest>, ValidationError> {
        self.ingester.check_count(self.pending.len())?;

        let metadata = FileMetadata {
            order_id: self.order_id,
        };
        self.pending
            .into_iter()
            .map(|file| {
                self.ingester
                    .build(file.name, file.mime_type, file.payload, metadata.clone())
            })
            .collect()
    }
}
