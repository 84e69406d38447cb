//! `reqwest` implementation of the provider transport.

use std::time::Duration;

use bytes::Bytes;
use linkdrop_core::credential::AccessCredential;
use linkdrop_core::provider::{
    CreateLinkArg, ListLinksArg, ProviderReply, ProviderTransport, RefreshGrant, TransportError,
    UploadArg,
};
use linkdrop_shared::DropboxConfig;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::endpoints::DropboxEndpoints;
use crate::error::DropboxError;
use crate::header::header_safe_json;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Dropbox HTTP client.
///
/// Only moves bytes: every reply, success or not, is handed back as a
/// [`ProviderReply`] for the pipeline to interpret.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    http: reqwest::Client,
    endpoints: DropboxEndpoints,
}

impl DropboxClient {
    /// Create a client from a prepared `reqwest::Client`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoints: DropboxEndpoints) -> Self {
        Self { http, endpoints }
    }

    /// Create a client with the configured endpoints and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DropboxConfig) -> Result<Self, DropboxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::new(http, DropboxEndpoints::from(config)))
    }

    /// Configured endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &DropboxEndpoints {
        &self.endpoints
    }
}

impl ProviderTransport for DropboxClient {
    async fn exchange_refresh_token(
        &self,
        grant: &RefreshGrant<'_>,
    ) -> Result<ProviderReply, TransportError> {
        debug!(url = %self.endpoints.token_url, "Exchanging refresh token");
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(grant)
            .send()
            .await
            .map_err(transport_error)?;
        into_reply(response).await
    }

    async fn upload(
        &self,
        credential: &AccessCredential,
        arg: &UploadArg,
        payload: Bytes,
    ) -> Result<ProviderReply, TransportError> {
        let api_arg = header_safe_json(arg)
            .map_err(|e| TransportError::request(format!("invalid upload argument: {e}")))?;

        debug!(path = %arg.path, size = payload.len(), "Uploading file");
        let response = self
            .http
            .post(self.endpoints.upload())
            .bearer_auth(credential.bearer())
            .header(API_ARG_HEADER, api_arg)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await
            .map_err(transport_error)?;
        into_reply(response).await
    }

    async fn create_shared_link(
        &self,
        credential: &AccessCredential,
        arg: &CreateLinkArg,
    ) -> Result<ProviderReply, TransportError> {
        debug!(path = %arg.path, "Creating shared link");
        let response = self
            .http
            .post(self.endpoints.create_shared_link())
            .bearer_auth(credential.bearer())
            .json(arg)
            .send()
            .await
            .map_err(transport_error)?;
        into_reply(response).await
    }

    async fn list_shared_links(
        &self,
        credential: &AccessCredential,
        arg: &ListLinksArg,
    ) -> Result<ProviderReply, TransportError> {
        debug!(path = %arg.path, "Listing shared links");
        let response = self
            .http
            .post(self.endpoints.list_shared_links())
            .bearer_auth(credential.bearer())
            .json(arg)
            .send()
            .await
            .map_err(transport_error)?;
        into_reply(response).await
    }
}

async fn into_reply(response: reqwest::Response) -> Result<ProviderReply, TransportError> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(transport_error)?;
    Ok(ProviderReply::from_text(status, &text))
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else {
        TransportError::request(err.to_string())
    }
}
