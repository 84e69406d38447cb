//! Outcome types.

use serde::Serialize;
use serde_json::Value;

/// Why a single file failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    /// Failing stage: `upload` or `link`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Provider payload, verbatim.
    pub details: Value,
}

/// Exactly one of a link or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeResult {
    /// Direct-download URL.
    Link(String),
    /// Failure description.
    Error(FileFailure),
}

/// Result for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    /// Name as supplied by the client.
    pub name: String,
    /// Link or error, flattened into the object.
    #[serde(flatten)]
    pub result: OutcomeResult,
}

impl UploadOutcome {
    /// The link, if the file succeeded.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match &self.result {
            OutcomeResult::Link(url) => Some(url),
            OutcomeResult::Error(_) => None,
        }
    }

    /// The failure, if the file failed.
    #[must_use]
    pub fn error(&self) -> Option<&FileFailure> {
        match &self.result {
            OutcomeResult::Link(_) => None,
            OutcomeResult::Error(failure) => Some(failure),
        }
    }
}

/// Final batch result, one outcome per input file in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReport {
    /// Always `true`; per-file failures live in `files`.
    pub success: bool,
    /// Outcomes.
    pub files: Vec<UploadOutcome>,
}
