//! Ingester implementation.

use base64::Engine;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tracing::debug;

use super::config::{UploadLimits, normalize_mime_type};
use super::error::ValidationError;
use super::sanitize::{base_name, extension, sanitize_metadata};
use super::types::{EnvelopeFile, FileMetadata, FileUploadRequest, UploadEnvelope};

/// Base64 engine (standard alphabet, padded).
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Validates request bodies and produces [`FileUploadRequest`] records.
#[derive(Debug, Clone, Default)]
pub struct MultipartIngester {
    limits: UploadLimits,
}

impl MultipartIngester {
    /// Create an ingester enforcing `limits`.
    #[must_use]
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    /// Get the limits.
    #[must_use]
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Parse and validate a JSON envelope body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a valid envelope or any file
    /// violates the limits.
    pub fn ingest_json(&self, body: &[u8]) -> Result<Vec<FileUploadRequest>, ValidationError> {
        let envelope: UploadEnvelope = serde_json::from_slice(body)
            .map_err(|e| ValidationError::malformed(e.to_string()))?;
        self.ingest_envelope(envelope)
    }

    /// Validate an already-parsed envelope.
    ///
    /// The file count is checked before anything is decoded; each file's
    /// declared shape and encoded length are checked before its payload is
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in input order.
    pub fn ingest_envelope(
        &self,
        envelope: UploadEnvelope,
    ) -> Result<Vec<FileUploadRequest>, ValidationError> {
        let files = envelope.files.unwrap_or_default();
        self.check_count(files.len())?;

        let batch_order = envelope
            .order_id
            .as_deref()
            .and_then(|raw| self.sanitize_metadata(raw));

        files
            .into_iter()
            .map(|file| self.decode_file(file, batch_order.as_deref()))
            .collect()
    }

    fn decode_file(
        &self,
        file: EnvelopeFile,
        batch_order: Option<&str>,
    ) -> Result<FileUploadRequest, ValidationError> {
        self.check_declared(&file.name, &file.mime_type, file.size)?;

        let encoded = strip_data_url(&file.data);
        let max = self.limits.max_file_size;
        // Whitespace is dropped before decoding; padding removes at most two
        // bytes from a full quantum.
        let significant = encoded.bytes().filter(|b| !b.is_ascii_whitespace()).count();
        let min_decoded = (len_u64(significant) / 4 * 3).saturating_sub(2);
        if min_decoded > max {
            return Err(ValidationError::file_too_large(&file.name, min_decoded, max));
        }

        let decoded = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
            let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            b64().decode(compact)
        } else {
            b64().decode(encoded)
        }
        .map_err(|e| ValidationError::BadEncoding {
            file: file.name.clone(),
            message: e.to_string(),
        })?;

        let order_id = file
            .order_id
            .as_deref()
            .and_then(|raw| self.sanitize_metadata(raw))
            .or_else(|| batch_order.map(str::to_string));

        self.build(
            file.name,
            file.mime_type,
            Bytes::from(decoded),
            FileMetadata { order_id },
        )
    }

    /// Check the number of files in a batch.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty batch or more than `max_files` files.
    pub fn check_count(&self, count: usize) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::NoFiles);
        }
        if count > self.limits.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.limits.max_files,
            });
        }
        Ok(())
    }

    /// Validate everything known about a file before reading its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the name, extension, MIME type or declared size
    /// is not acceptable.
    pub fn check_declared(
        &self,
        name: &str,
        mime_type: &str,
        declared_size: Option<u64>,
    ) -> Result<(), ValidationError> {
        let base = base_name(name).ok_or_else(|| ValidationError::BadName {
            file: name.to_string(),
        })?;

        let allowed_ext = extension(base).is_some_and(|ext| self.limits.is_extension_allowed(&ext));
        if !allowed_ext {
            return Err(ValidationError::BadExtension {
                file: name.to_string(),
            });
        }

        if !self.limits.is_mime_type_allowed(mime_type) {
            return Err(ValidationError::BadMime {
                file: name.to_string(),
                mime_type: mime_type.to_string(),
            });
        }

        if let Some(size) = declared_size
            && size > self.limits.max_file_size
        {
            return Err(ValidationError::file_too_large(
                name,
                size,
                self.limits.max_file_size,
            ));
        }

        Ok(())
    }

    /// Read a byte stream, giving up as soon as it crosses `max_file_size`.
    ///
    /// At most `max_file_size` bytes are buffered, whatever the client sends.
    ///
    /// # Errors
    ///
    /// Returns `FileTooLarge` on overflow. A failing stream yields its own
    /// error, converted into a [`ValidationError`].
    pub async fn read_bounded<S, E>(&self, file: &str, stream: S) -> Result<Bytes, ValidationError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<ValidationError>,
    {
        let max = self.limits.max_file_size;
        let mut stream = std::pin::pin!(stream);
        let mut buffer = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return Err(e.into()),
            };

            let total = len_u64(buffer.len()).saturating_add(len_u64(chunk.len()));
            if total > max {
                debug!(file = %file, received = total, max, "Aborting oversized upload stream");
                return Err(ValidationError::file_too_large(file, total, max));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }

    /// Final validation and construction of a file record.
    ///
    /// # Errors
    ///
    /// Returns an error if any declared property or the actual payload size
    /// violates the limits.
    pub fn build(
        &self,
        name: String,
        mime_type: String,
        payload: Bytes,
        metadata: FileMetadata,
    ) -> Result<FileUploadRequest, ValidationError> {
        self.check_declared(&name, &mime_type, Some(len_u64(payload.len())))?;
        let mime_type = normalize_mime_type(&mime_type);
        Ok(FileUploadRequest::new(name, mime_type, payload, metadata))
    }

    /// Sanitize naming metadata with the configured length bound.
    #[must_use]
    pub fn sanitize_metadata(&self, raw: &str) -> Option<String> {
        sanitize_metadata(raw, self.limits.max_metadata_len)
    }
}

/// Drop a `data:<mime>;base64,` prefix if present.
fn strip_data_url(data: &str) -> &str {
    match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(data, |(_, payload)| payload),
        None => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ingester() -> MultipartIngester {
        MultipartIngester::new(UploadLimits::new().with_max_files(3).with_max_file_size(16))
    }

    fn body(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).expect("serializes")
    }

    fn file(name: &str, mime: &str, payload: &[u8]) -> serde_json::Value {
        json!({ "name": name, "type": mime, "data": b64().encode(payload) })
    }

    #[test]
    fn test_ingest_json_single_file() {
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [file("a.jpg", "image/jpeg", b"abc")] })))
            .expect("valid batch");

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "a.jpg");
        assert_eq!(files[0].mime_type(), "image/jpeg");
        assert_eq!(files[0].size_bytes(), 3);
        assert_eq!(files[0].payload().as_ref(), b"abc");
        assert_eq!(files[0].metadata(), &FileMetadata::default());
    }

    #[test]
    fn test_ingest_json_preserves_order() {
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [
                file("b.png", "image/png", b"2"),
                file("a.jpg", "image/jpeg", b"1"),
                file("b.png", "image/png", b"3"),
            ] })))
            .expect("valid batch");

        let names: Vec<&str> = files.iter().map(FileUploadRequest::name).collect();
        assert_eq!(names, vec!["b.png", "a.jpg", "b.png"]);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "files": null }))]
    #[case(json!({ "files": [] }))]
    fn test_missing_or_empty_files(#[case] value: serde_json::Value) {
        assert_eq!(
            ingester().ingest_json(&body(&value)).unwrap_err(),
            ValidationError::NoFiles
        );
    }

    #[test]
    fn test_too_many_files_rejected_before_decoding() {
        // Garbage data: the count check must fire before any decode.
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": "!!not base64!!" });
        let err = ingester()
            .ingest_json(&body(&json!({ "files": [entry.clone(), entry.clone(), entry.clone(), entry] })))
            .unwrap_err();

        assert_eq!(err, ValidationError::TooManyFiles { count: 4, max: 3 });
    }

    #[rstest]
    #[case("a.exe", "image/jpeg", "bad_extension")]
    #[case("noext", "image/jpeg", "bad_extension")]
    #[case("a.jpg", "text/html", "bad_mime")]
    #[case("../", "image/jpeg", "bad_name")]
    #[case("", "image/jpeg", "bad_name")]
    fn test_rejections_name_the_file(
        #[case] name: &str,
        #[case] mime: &str,
        #[case] reason: &str,
    ) {
        let err = ingester()
            .ingest_json(&body(&json!({ "files": [
                file("ok.png", "image/png", b"1"),
                file(name, mime, b"1"),
            ] })))
            .unwrap_err();

        assert_eq!(err.reason(), reason);
        assert_eq!(err.file(), Some(name));
    }

    #[test]
    fn test_double_dot_inside_name_accepted() {
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [file("my..photo.jpg", "image/jpeg", b"1")] })))
            .expect("valid");
        assert_eq!(files[0].name(), "my..photo.jpg");
    }

    #[test]
    fn test_declared_size_over_limit() {
        let mut entry = file("a.jpg", "image/jpeg", b"abc");
        entry["size"] = json!(17);

        let err = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .unwrap_err();

        assert_eq!(err, ValidationError::file_too_large("a.jpg", 17, 16));
    }

    #[test]
    fn test_encoded_length_checked_before_decoding() {
        // 32 base64 chars decode to at least 22 bytes; invalid alphabet proves
        // the decoder never ran.
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": "*".repeat(32) });

        let err = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .unwrap_err();

        assert_eq!(err.reason(), "file_too_large");
    }

    #[test]
    fn test_decoded_size_over_limit() {
        // 17 bytes: encoded length passes the coarse bound, exact check rejects.
        let err = ingester()
            .ingest_json(&body(&json!({ "files": [file("a.jpg", "image/jpeg", &[7u8; 17])] })))
            .unwrap_err();

        assert_eq!(err, ValidationError::file_too_large("a.jpg", 17, 16));
    }

    #[test]
    fn test_exact_limit_accepted() {
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [file("a.jpg", "image/jpeg", &[7u8; 16])] })))
            .expect("at the limit");
        assert_eq!(files[0].size_bytes(), 16);
    }

    #[test]
    fn test_bad_base64() {
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": "ab$d" });
        let err = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .unwrap_err();
        assert_eq!(err.reason(), "bad_encoding");
    }

    #[test]
    fn test_data_url_and_whitespace_accepted() {
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": "data:image/jpeg;base64,YW\nJj" });
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .expect("valid");
        assert_eq!(files[0].payload().as_ref(), b"abc");
    }

    /// Base64 wrapped every `width` characters, as MIME encoders emit it.
    fn wrapped(payload: &[u8], width: usize) -> String {
        let encoded = b64().encode(payload);
        encoded
            .as_bytes()
            .chunks(width)
            .map(|line| std::str::from_utf8(line).expect("ascii"))
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    #[test]
    fn test_wrapped_payload_at_exact_limit_accepted() {
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": wrapped(&[7u8; 16], 4) });
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .expect("at the limit");
        assert_eq!(files[0].size_bytes(), 16);
    }

    #[test]
    fn test_wrapped_payload_over_limit_rejected() {
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": wrapped(&[7u8; 17], 4) });
        let err = ingester()
            .ingest_json(&body(&json!({ "files": [entry] })))
            .unwrap_err();
        assert_eq!(err, ValidationError::file_too_large("a.jpg", 17, 16));
    }

    #[test]
    fn test_line_wrapped_payload_under_default_limit() {
        let limits = UploadLimits::default();
        let size = usize::try_from(limits.max_file_size).expect("fits") - 64 * 1024;
        let entry = json!({ "name": "a.jpg", "type": "image/jpeg", "data": wrapped(&vec![0u8; size], 76) });

        let files = MultipartIngester::new(limits)
            .ingest_json(&body(&json!({ "files": [entry] })))
            .expect("under the limit");
        assert_eq!(files[0].payload().len(), size);
    }

    #[test]
    fn test_malformed_json() {
        let err = ingester().ingest_json(b"{\"files\": [").unwrap_err();
        assert_eq!(err.reason(), "malformed_body");
    }

    #[test]
    fn test_order_id_sanitized_and_overridable() {
        let mut second = file("b.png", "image/png", b"2");
        second["orderId"] = json!("override/..#1");
        let files = ingester()
            .ingest_json(&body(&json!({
                "order_id": "ORD 42!",
                "files": [file("a.jpg", "image/jpeg", b"1"), second],
            })))
            .expect("valid");

        assert_eq!(files[0].metadata().order_id.as_deref(), Some("ORD42"));
        assert_eq!(files[1].metadata().order_id.as_deref(), Some("override1"));
    }

    #[test]
    fn test_mime_type_normalized() {
        let files = ingester()
            .ingest_json(&body(&json!({ "files": [file("a.jpg", "Image/JPEG; q=1", b"1")] })))
            .expect("valid");
        assert_eq!(files[0].mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_read_bounded_collects_stream() {
        let chunks = vec![
            Ok::<_, Infallible>(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ];
        let payload = ingester()
            .read_bounded("a.jpg", futures::stream::iter(chunks))
            .await
            .expect("within limit");
        assert_eq!(payload.as_ref(), b"abcd");
    }

    #[tokio::test]
    async fn test_read_bounded_stops_at_limit() {
        let pulled = AtomicUsize::new(0);
        let stream = futures::stream::iter(
            (0..100).map(|_| Ok::<_, Infallible>(Bytes::from_static(&[0u8; 10]))),
        )
        .inspect(|_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        });

        let err = ingester().read_bounded("big.jpg", stream).await.unwrap_err();

        assert_eq!(err, ValidationError::file_too_large("big.jpg", 20, 16));
        // Two chunks pulled out of a hundred.
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_read_bounded_stream_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(ValidationError::malformed("connection reset")),
        ];
        let err = ingester()
            .read_bounded("a.jpg", futures::stream::iter(chunks))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "malformed_body");
    }

    #[tokio::test]
    async fn test_read_bounded_keeps_body_limit_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(ValidationError::BodyTooLarge { max: 100 }),
        ];
        let err = ingester()
            .read_bounded("a.jpg", futures::stream::iter(chunks))
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::BodyTooLarge { max: 100 });
    }
}
