//! Credential types.

use std::fmt;

use linkdrop_shared::DropboxConfig;

use crate::provider::RefreshGrant;

/// Client identity plus refresh secret, injected at construction.
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl ClientCredentials {
    /// Create client credentials.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Client identity.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Build the refresh grant for the token endpoint.
    #[must_use]
    pub fn refresh_grant(&self) -> RefreshGrant<'_> {
        RefreshGrant {
            grant_type: "refresh_token",
            refresh_token: &self.refresh_token,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        }
    }
}

impl From<&DropboxConfig> for ClientCredentials {
    fn from(config: &DropboxConfig) -> Self {
        Self::new(
            config.app_key.clone(),
            config.app_secret.clone(),
            config.refresh_token.clone(),
        )
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Short-lived bearer token, scoped to one request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredential(String);

impl AccessCredential {
    /// Wrap a bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token, for the `Authorization: Bearer` header.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential(<redacted>)")
    }
}
