//! Remote object storage stage.
//!
//! Writes one validated file to the provider under a collision-safe path:
//!
//! ```text
//! /{folder}/{order_id}/{stamp}-{seq:03}-{sanitized_name}
//! ```
//!
//! `folder` and `order_id` are omitted when absent. `stamp` is captured once
//! per batch and `seq` is the file's position in that batch, so two files
//! with the same name never share a path.

mod error;
mod naming;
mod service;

pub use error::UploadError;
pub use naming::BatchNaming;
pub use service::{RemoteObjectRecord, StorageUploader};
