//! Batch orchestration.
//!
//! One credential exchange per batch, then each file is uploaded and linked
//! in input order. A failing file is recorded and the batch moves on; only a
//! credential failure aborts the whole batch.

pub mod error;
pub mod service;


pub use error::{FileError, PipelineError};
pub use service::UploadPipeline;
