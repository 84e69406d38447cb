//! Dropbox transport for the upload pipeline.
//!
//! This crate provides:
//! - [`DropboxClient`], the `reqwest` implementation of
//!   [`ProviderTransport`](linkdrop_core::provider::ProviderTransport)
//! - Endpoint configuration, overridable for tests

mod client;
mod endpoints;
mod error;
mod header;

pub use client::DropboxClient;
pub use endpoints::DropboxEndpoints;
pub use error::DropboxError;
pub use header::header_safe_json;
