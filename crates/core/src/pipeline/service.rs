//! Upload pipeline implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::error::{FileError, PipelineError};
use crate::credential::{AccessCredential, ClientCredentials, CredentialBroker};
use crate::ingest::FileUploadRequest;
use crate::link::{LinkProvisioner, PublicLink};
use crate::outcome::{ResponseAssembler, UploadReport};
use crate::provider::ProviderTransport;
use crate::storage::{BatchNaming, StorageUploader};

/// Composes the credential, storage and link stages over one transport.
pub struct UploadPipeline<P: ProviderTransport> {
    broker: CredentialBroker<P>,
    uploader: StorageUploader<P>,
    provisioner: LinkProvisioner<P>,
    folder: Option<String>,
}

impl<P: ProviderTransport> UploadPipeline<P> {
    /// Create a pipeline.
    ///
    /// `folder` is the optional remote prefix every path is placed under.
    #[must_use]
    pub fn new(transport: Arc<P>, credentials: ClientCredentials, folder: Option<String>) -> Self {
        Self {
            broker: CredentialBroker::new(Arc::clone(&transport), credentials),
            uploader: StorageUploader::new(Arc::clone(&transport)),
            provisioner: LinkProvisioner::new(transport),
            folder,
        }
    }

    /// Process a validated batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the access credential cannot be obtained.
    /// Per-file failures are reported inside the [`UploadReport`].
    pub async fn run(&self, files: Vec<FileUploadRequest>) -> Result<UploadReport, PipelineError> {
        self.run_at(files, Utc::now()).await
    }

    /// Process a batch with an explicit start time for path stamping.
    ///
    /// # Errors
    ///
    /// See [`UploadPipeline::run`].
    pub async fn run_at(
        &self,
        files: Vec<FileUploadRequest>,
        started_at: DateTime<Utc>,
    ) -> Result<UploadReport, PipelineError> {
        let mut assembler = ResponseAssembler::with_capacity(files.len());
        if files.is_empty() {
            return Ok(assembler.finish());
        }

        let credential = self.broker.acquire().await?;
        let naming = BatchNaming::new(self.folder.as_deref(), started_at);

        for (seq, file) in files.iter().enumerate() {
            let path = naming.path_for(seq, file);
            let result = self.process(&credential, &path, file).await;
            if let Err(err) = &result {
                warn!(file = %file.name(), seq, kind = err.kind(), error = %err, "File failed");
            }
            assembler.record(file.name(), result);
        }

        info!(
            stamp = %naming.stamp(),
            succeeded = assembler.succeeded(),
            failed = assembler.failed(),
            "Batch processed"
        );
        Ok(assembler.finish())
    }

    async fn process(
        &self,
        credential: &AccessCredential,
        path: &str,
        file: &FileUploadRequest,
    ) -> Result<PublicLink, FileError> {
        let record = self.uploader.upload(credential, path, file).await?;
        let link = self
            .provisioner
            .provision(credential, &record.canonical_path)
            .await?;
        Ok(link)
    }
}
