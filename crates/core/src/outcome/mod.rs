//! Per-file outcomes and the batch report.

mod assembler;
mod types;

pub use assembler::ResponseAssembler;
pub use types::{FileFailure, OutcomeResult, UploadOutcome, UploadReport};
