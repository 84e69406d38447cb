//! Link provisioner implementation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::LinkError;
use super::normalize::to_direct_url;
use crate::credential::AccessCredential;
use crate::provider::{CreateLinkArg, ListLinksArg, ProviderTransport, Visibility};

/// Error tag the provider uses when a link for the path already exists.
const LINK_EXISTS_TAG: &str = "shared_link_already_exists";

/// A public, direct-download link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicLink {
    /// The rewritten URL.
    pub url: String,
    /// Always public.
    pub visibility: Visibility,
    /// Whether the URL serves raw bytes rather than a preview page.
    pub direct: bool,
}

/// Obtains public links for stored objects.
pub struct LinkProvisioner<P: ProviderTransport> {
    transport: Arc<P>,
}

impl<P: ProviderTransport> LinkProvisioner<P> {
    /// Create a provisioner over `transport`.
    #[must_use]
    pub fn new(transport: Arc<P>) -> Self {
        Self { transport }
    }

    /// Create or retrieve a public link for `canonical_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither creation nor the existing-link lookup
    /// yields a usable URL.
    pub async fn provision(
        &self,
        credential: &AccessCredential,
        canonical_path: &str,
    ) -> Result<PublicLink, LinkError> {
        let raw = match self.create(credential, canonical_path).await? {
            Some(url) => url,
            None => self.find_existing(credential, canonical_path).await?,
        };

        let url = to_direct_url(&raw).map_err(|e| LinkError::InvalidUrl {
            path: canonical_path.to_string(),
            url: raw.clone(),
            message: e.to_string(),
        })?;

        info!(path = %canonical_path, "Public link ready");
        Ok(PublicLink {
            url,
            visibility: Visibility::Public,
            direct: true,
        })
    }

    /// Returns `None` when a link already exists.
    async fn create(
        &self,
        credential: &AccessCredential,
        path: &str,
    ) -> Result<Option<String>, LinkError> {
        let reply = self
            .transport
            .create_shared_link(credential, &CreateLinkArg::public(path))
            .await
            .map_err(|source| LinkError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !reply.is_success() || reply.error_summary().is_some() {
            if reply.error_tag() == Some(LINK_EXISTS_TAG) {
                debug!(path = %path, "Link already exists, looking it up");
                return Ok(None);
            }
            warn!(path = %path, status = reply.status, "Link creation rejected");
            return Err(LinkError::CreateRejected {
                path: path.to_string(),
                status: reply.status,
                details: reply.body,
            });
        }

        match reply.str_field("url").filter(|url| !url.is_empty()) {
            Some(url) => Ok(Some(url.to_string())),
            None => Err(LinkError::MissingUrl {
                path: path.to_string(),
                details: reply.body,
            }),
        }
    }

    async fn find_existing(
        &self,
        credential: &AccessCredential,
        path: &str,
    ) -> Result<String, LinkError> {
        let reply = self
            .transport
            .list_shared_links(credential, &ListLinksArg::direct(path))
            .await
            .map_err(|source| LinkError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !reply.is_success() {
            warn!(path = %path, status = reply.status, "Link listing rejected");
            return Err(LinkError::ListRejected {
                path: path.to_string(),
                status: reply.status,
                details: reply.body,
            });
        }

        let listed = reply
            .body
            .get("links")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|link| link.get("url").and_then(Value::as_str))
            .find(|url| !url.is_empty())
            .map(str::to_string);

        listed.ok_or_else(|| LinkError::NoListedLink {
            path: path.to_string(),
            details: reply.body,
        })
    }
}
