//! Request ingestion.
//!
//! Turns an untrusted request body into validated [`FileUploadRequest`]
//! records. Two body shapes are supported:
//! - JSON envelope `{files: [{name, type, data, size?}], order_id?}` with
//!   base64 payloads
//! - `multipart/form-data`, fed field by field through [`MultipartBatch`]
//!
//! Every check runs before any provider call. Payload size is bounded while
//! reading: base64 text length is checked before decoding and streamed
//! parts are abandoned as soon as they cross the limit.

mod config;
mod error;
mod multipart;
mod sanitize;
mod service;
mod types;

pub use config::{UploadLimits, normalize_mime_type};
pub use error::ValidationError;
pub use multipart::{MultipartBatch, is_order_field};
pub use sanitize::{base_name, extension, sanitize_filename, sanitize_metadata};
pub use service::MultipartIngester;
pub use types::{EnvelopeFile, FileMetadata, FileUploadRequest, UploadEnvelope};
