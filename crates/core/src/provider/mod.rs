//! Storage provider transport seam.
//!
//! Everything that crosses the network goes through [`ProviderTransport`].
//! Implementations only move bytes: they send the wire descriptors defined
//! here and hand back the raw status and body as a [`ProviderReply`]. All
//! protocol decisions (what counts as success, which error tag triggers the
//! link fallback) live in the pipeline stages.
//!
//! ```text
//! ┌────────────────────┐  RefreshGrant   ┌──────────────────────────────┐
//! │ CredentialBroker   │ ──────────────▶ │                              │
//! ├────────────────────┤  UploadArg      │      ProviderTransport       │
//! │ StorageUploader    │ ──────────────▶ │  (linkdrop-dropbox client)   │
//! ├────────────────────┤  CreateLinkArg  │                              │
//! │ LinkProvisioner    │ ──────────────▶ │                              │
//! │                    │  ListLinksArg   │                              │
//! └────────────────────┘ ──────────────▶ └──────────────────────────────┘
//! ```

mod error;
mod types;

use std::future::Future;

use bytes::Bytes;

use crate::credential::AccessCredential;

pub use error::TransportError;
pub use types::{
    CreateLinkArg, LinkSettings, ListLinksArg, ProviderReply, RefreshGrant, UploadArg, Visibility,
    WriteMode,
};

/// Network transport to the remote object store.
///
/// This trait is implemented by the dropbox crate to perform the actual HTTP calls.
pub trait ProviderTransport: Send + Sync {
    /// Exchange a refresh grant at the token endpoint.
    fn exchange_refresh_token(
        &self,
        grant: &RefreshGrant<'_>,
    ) -> impl Future<Output = Result<ProviderReply, TransportError>> + Send;

    /// Upload raw bytes under the path described by `arg`.
    fn upload(
        &self,
        credential: &AccessCredential,
        arg: &UploadArg,
        payload: Bytes,
    ) -> impl Future<Output = Result<ProviderReply, TransportError>> + Send;

    /// Request creation of a shared link.
    fn create_shared_link(
        &self,
        credential: &AccessCredential,
        arg: &CreateLinkArg,
    ) -> impl Future<Output = Result<ProviderReply, TransportError>> + Send;

    /// List existing shared links for a path.
    fn list_shared_links(
        &self,
        credential: &AccessCredential,
        arg: &ListLinksArg,
    ) -> impl Future<Output = Result<ProviderReply, TransportError>> + Send;
}
