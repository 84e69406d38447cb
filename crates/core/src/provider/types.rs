//! Wire descriptors and replies exchanged with the provider.

use serde::Serialize;
use serde_json::Value;

/// Raw provider reply: HTTP status plus body.
///
/// The body is kept verbatim so failures can be surfaced without loss. JSON
/// bodies are parsed; anything else is stored as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Value,
}

impl ProviderReply {
    /// Create a reply from an already-parsed body.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Create a reply from a raw response body.
    #[must_use]
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The provider's `error_summary`, if present.
    #[must_use]
    pub fn error_summary(&self) -> Option<&str> {
        self.body.get("error_summary").and_then(Value::as_str)
    }

    /// The provider's error tag.
    ///
    /// Reads `error[".tag"]` and falls back to the first segment of
    /// `error_summary` (`shared_link_already_exists/..` gives
    /// `shared_link_already_exists`).
    #[must_use]
    pub fn error_tag(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(|error| error.get(".tag"))
            .and_then(Value::as_str)
            .or_else(|| {
                self.error_summary()
                    .and_then(|summary| summary.split('/').next())
                    .filter(|tag| !tag.is_empty())
            })
    }

    /// A string field from the top level of the body.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}

/// OAuth refresh-token grant, sent form-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshGrant<'a> {
    /// Always `refresh_token`.
    pub grant_type: &'static str,
    /// Long-lived refresh secret.
    pub refresh_token: &'a str,
    /// Client identity.
    pub client_id: &'a str,
    /// Client secret.
    pub client_secret: &'a str,
}

/// Conflict policy for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Never overwrite an existing object.
    Add,
}

/// Upload argument descriptor (`Dropbox-API-Arg`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadArg {
    /// Remote path.
    pub path: String,
    /// Conflict policy.
    pub mode: WriteMode,
    /// Let the provider rename on conflict.
    pub autorename: bool,
    /// Whether to suppress client notifications.
    pub mute: bool,
}

impl UploadArg {
    /// Add-only upload that auto-renames on conflict.
    #[must_use]
    pub fn add(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::Add,
            autorename: true,
            mute: false,
        }
    }
}

/// Shared link visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone with the link.
    Public,
}

/// Settings for link creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSettings {
    /// Requested visibility.
    pub requested_visibility: Visibility,
}

/// Link creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateLinkArg {
    /// Canonical path of the stored object.
    pub path: String,
    /// Link settings.
    pub settings: LinkSettings,
}

impl CreateLinkArg {
    /// Public link request for `path`.
    #[must_use]
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            settings: LinkSettings {
                requested_visibility: Visibility::Public,
            },
        }
    }
}

/// Link listing request scoped to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListLinksArg {
    /// Canonical path of the stored object.
    pub path: String,
    /// Only return links to the path itself, not to parent folders.
    pub direct_only: bool,
}

impl ListLinksArg {
    /// Listing of links pointing directly at `path`.
    #[must_use]
    pub fn direct(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direct_only: true,
        }
    }
}
