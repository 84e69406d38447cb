//! Credential exchange.
//!
//! A static refresh secret is traded for a short-lived bearer token once per
//! batch. Nothing is cached: every call to [`CredentialBroker::acquire`]
//! performs a fresh exchange.

mod error;
mod service;
mod types;

pub use error::AuthError;
pub use service::CredentialBroker;
pub use types::{AccessCredential, ClientCredentials};
