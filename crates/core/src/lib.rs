//! Core upload pipeline for Linkdrop.
//!
//! This crate contains the whole upload flow with ZERO web framework or HTTP
//! client dependencies. Network access goes through the
//! [`provider::ProviderTransport`] trait, implemented by `linkdrop-dropbox`.
//!
//! # Modules
//!
//! - `ingest` - Request body validation and decoding
//! - `credential` - Refresh-token exchange for an access credential
//! - `storage` - Remote path naming and file upload
//! - `link` - Public link creation, lookup and direct-download rewrite
//! - `outcome` - Per-file outcomes and the batch report
//! - `pipeline` - Orchestration of the stages above
//! - `provider` - Transport seam and wire descriptors

pub mod credential;
pub mod ingest;
pub mod link;
pub mod outcome;
pub mod pipeline;
pub mod provider;
pub mod storage;

#[cfg(test)]
mod testing;
