//! Remote path generation.

use chrono::{DateTime, Utc};

use crate::ingest::{FileUploadRequest, base_name, sanitize_filename};

/// Path builder for one batch.
///
/// Every file in the batch shares the prefix and the start stamp; the
/// sequence index makes each path unique.
#[derive(Debug, Clone)]
pub struct BatchNaming {
    folder: Option<String>,
    stamp: String,
}

impl BatchNaming {
    /// Create a naming scheme for a batch started at `started_at`.
    ///
    /// Leading and trailing slashes in `folder` are ignored; an empty folder
    /// is treated as absent.
    #[must_use]
    pub fn new(folder: Option<&str>, started_at: DateTime<Utc>) -> Self {
        let folder = folder
            .map(|f| f.trim_matches('/'))
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        Self {
            folder,
            stamp: started_at.format("%Y%m%dT%H%M%S%3fZ").to_string(),
        }
    }

    /// Batch start stamp.
    #[must_use]
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Path for the `seq`-th file of the batch.
    #[must_use]
    pub fn path_for(&self, seq: usize, file: &FileUploadRequest) -> String {
        let mut path = String::new();
        if let Some(folder) = &self.folder {
            path.push('/');
            path.push_str(folder);
        }
        if let Some(order_id) = &file.metadata().order_id {
            path.push('/');
            path.push_str(order_id);
        }

        let name = base_name(file.name()).unwrap_or(file.name());
        path.push_str(&format!(
            "/{}-{seq:03}-{}",
            self.stamp,
            sanitize_filename(name)
        ));
        path
    }
}
