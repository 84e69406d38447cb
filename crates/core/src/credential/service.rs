//! Credential broker implementation.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::AuthError;
use super::types::{AccessCredential, ClientCredentials};
use crate::provider::ProviderTransport;

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchanges the refresh secret for an access credential.
pub struct CredentialBroker<P: ProviderTransport> {
    transport: Arc<P>,
    credentials: ClientCredentials,
}

impl<P: ProviderTransport> CredentialBroker<P> {
    /// Create a broker over `transport`.
    #[must_use]
    pub fn new(transport: Arc<P>, credentials: ClientCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Request a fresh access credential.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token endpoint cannot be reached
    /// - The endpoint answers with a non-success status
    /// - The response carries no `access_token`
    pub async fn acquire(&self) -> Result<AccessCredential, AuthError> {
        let reply = self
            .transport
            .exchange_refresh_token(&self.credentials.refresh_grant())
            .await?;

        if !reply.is_success() {
            warn!(status = reply.status, "Token endpoint rejected refresh grant");
            return Err(AuthError::Rejected {
                status: reply.status,
                details: reply.body,
            });
        }

        let token = serde_json::from_value::<TokenResponse>(reply.body.clone())
            .ok()
            .and_then(|parsed| parsed.access_token)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => {
                debug!(client_id = %self.credentials.client_id(), "Access credential acquired");
                Ok(AccessCredential::new(token))
            }
            None => Err(AuthError::MissingToken {
                details: reply.body,
            }),
        }
    }
}
