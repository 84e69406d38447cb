//! Dropbox endpoint URLs.

use linkdrop_shared::DropboxConfig;

/// Base URLs for the three Dropbox hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropboxEndpoints {
    /// OAuth token endpoint (full URL).
    pub token_url: String,
    /// RPC host base.
    pub api_url: String,
    /// Content host base.
    pub content_url: String,
}

impl DropboxEndpoints {
    /// Point every endpoint at one base URL, e.g. a local mock server.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            token_url: format!("{base}/oauth2/token"),
            api_url: base.to_string(),
            content_url: base.to_string(),
        }
    }

    pub(crate) fn upload(&self) -> String {
        format!("{}/2/files/upload", self.content_url.trim_end_matches('/'))
    }

    pub(crate) fn create_shared_link(&self) -> String {
        format!(
            "{}/2/sharing/create_shared_link_with_settings",
            self.api_url.trim_end_matches('/')
        )
    }

    pub(crate) fn list_shared_links(&self) -> String {
        format!("{}/2/sharing/list_shared_links", self.api_url.trim_end_matches('/'))
    }
}

impl From<&DropboxConfig> for DropboxEndpoints {
    fn from(config: &DropboxConfig) -> Self {
        Self {
            token_url: config.token_url.clone(),
            api_url: config.api_url.clone(),
            content_url: config.content_url.clone(),
        }
    }
}
