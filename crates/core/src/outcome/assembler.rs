//! Outcome aggregation.

use super::types::{FileFailure, OutcomeResult, UploadOutcome, UploadReport};
use crate::link::PublicLink;
use crate::pipeline::FileError;

/// Collects outcomes in input order.
///
/// Failures do not stop the batch: each file gets exactly one outcome.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    files: Vec<UploadOutcome>,
    failed: usize,
}

impl ResponseAssembler {
    /// Create an assembler sized for `capacity` files.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: Vec::with_capacity(capacity),
            failed: 0,
        }
    }

    /// Record the outcome of the next file.
    pub fn record(&mut self, name: impl Into<String>, result: Result<PublicLink, FileError>) {
        let result = match result {
            Ok(link) => OutcomeResult::Link(link.url),
            Err(err) => {
                self.failed += 1;
                OutcomeResult::Error(FileFailure {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                    details: err.details(),
                })
            }
        };
        self.files.push(UploadOutcome {
            name: name.into(),
            result,
        });
    }

    /// Number of files that produced a link.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files.len() - self.failed
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Produce the batch report.
    #[must_use]
    pub fn finish(self) -> UploadReport {
        UploadReport {
            success: true,
            files: self.files,
        }
    }
}
