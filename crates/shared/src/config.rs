//! Application configuration management.

use std::fmt;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Dropbox app identity and endpoints.
    pub dropbox: DropboxConfig,
    /// Upload limits and allow-lists.
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Dropbox configuration.
///
/// The refresh token and app secret never leave the credential exchange;
/// `Debug` output redacts them.
#[derive(Clone, Deserialize)]
pub struct DropboxConfig {
    /// OAuth client id (Dropbox "app key").
    pub app_key: String,
    /// OAuth client secret (Dropbox "app secret").
    pub app_secret: String,
    /// Long-lived refresh token exchanged for access tokens.
    pub refresh_token: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// RPC endpoint base (sharing routes).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Content endpoint base (upload route).
    #[serde(default = "default_content_url")]
    pub content_url: String,
    /// Optional folder every upload is placed under.
    #[serde(default)]
    pub folder: Option<String>,
    /// Per-request timeout for provider calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for DropboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxConfig")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("content_url", &self.content_url)
            .field("folder", &self.folder)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_token_url() -> String {
    "https://api.dropboxapi.com/oauth2/token".to_string()
}

fn default_api_url() -> String {
    "https://api.dropboxapi.com".to_string()
}

fn default_content_url() -> String {
    "https://content.dropboxapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Upload limits and allow-lists.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of files per request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed file extensions, lowercase, without the dot.
    #[serde(default = "UploadConfig::default_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Allowed MIME types.
    #[serde(default = "UploadConfig::default_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Maximum length of sanitized naming metadata (e.g. order id).
    #[serde(default = "default_max_metadata_len")]
    pub max_metadata_len: usize,
}

impl UploadConfig {
    /// Default max files per request.
    pub const DEFAULT_MAX_FILES: usize = 3;
    /// Default max file size: 10 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default max metadata length.
    pub const DEFAULT_MAX_METADATA_LEN: usize = 64;

    /// Default allowed extensions.
    #[must_use]
    pub fn default_extensions() -> Vec<String> {
        ["jpg", "jpeg", "png", "gif", "webp", "pdf"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Default allowed MIME types.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            // Images
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            // Documents
            "application/pdf".to_string(),
        ]
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: Self::DEFAULT_MAX_FILES,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: Self::default_extensions(),
            allowed_mime_types: Self::default_mime_types(),
            max_metadata_len: Self::DEFAULT_MAX_METADATA_LEN,
        }
    }
}

fn default_max_files() -> usize {
    UploadConfig::DEFAULT_MAX_FILES
}

fn default_max_file_size() -> u64 {
    UploadConfig::DEFAULT_MAX_FILE_SIZE
}

fn default_max_metadata_len() -> usize {
    UploadConfig::DEFAULT_MAX_METADATA_LEN
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `LINKDROP__SECTION__KEY` environment variables. List values in
    /// the environment are comma separated.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LINKDROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_extensions")
                    .with_list_parse_key("upload.allowed_mime_types")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Rejects configurations the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the offending key.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let required = [
            ("dropbox.app_key", &self.dropbox.app_key),
            ("dropbox.app_secret", &self.dropbox.app_secret),
            ("dropbox.refresh_token", &self.dropbox.refresh_token),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(config::ConfigError::Message(format!("{key} must not be empty")));
        }
        if self.upload.max_files == 0 {
            return Err(config::ConfigError::Message(
                "upload.max_files must be at least 1".to_string(),
            ));
        }
        if self.upload.max_file_size == 0 {
            return Err(config::ConfigError::Message(
                "upload.max_file_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
