//! Upload limit configuration.

use linkdrop_shared::UploadConfig;

/// Limits and allow-lists enforced during ingestion.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Maximum number of files per request.
    pub max_files: usize,
    /// Maximum size of a single file in bytes.
    pub max_file_size: u64,
    /// Allowed extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
    /// Allowed MIME types.
    pub allowed_mime_types: Vec<String>,
    /// Maximum length of sanitized naming metadata.
    pub max_metadata_len: usize,
}

impl UploadLimits {
    /// Slack on top of the payloads for JSON keys, names and multipart headers.
    pub const ENVELOPE_OVERHEAD: usize = 64 * 1024;

    /// Create limits with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from(&UploadConfig::default())
    }

    /// Set maximum file count.
    #[must_use]
    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed extensions.
    #[must_use]
    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Set maximum metadata length.
    #[must_use]
    pub fn with_max_metadata_len(mut self, len: usize) -> Self {
        self.max_metadata_len = len;
        self
    }

    /// Check if a MIME type is allowed. Parameters and case are ignored.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        let normalized = normalize_mime_type(mime_type);
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&normalized))
    }

    /// Check if an extension (without the dot) is allowed.
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Longest base64 text that can decode to at most `max_file_size` bytes.
    #[must_use]
    pub fn max_encoded_len(&self) -> u64 {
        self.max_file_size.div_ceil(3).saturating_mul(4)
    }

    /// Upper bound for a whole request body.
    #[must_use]
    pub fn request_body_limit(&self) -> usize {
        let per_file = usize::try_from(self.max_encoded_len()).unwrap_or(usize::MAX);
        per_file
            .saturating_mul(self.max_files)
            .saturating_add(Self::ENVELOPE_OVERHEAD)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&UploadConfig> for UploadLimits {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_file_size: config.max_file_size,
            allowed_extensions: config.allowed_extensions.clone(),
            allowed_mime_types: config.allowed_mime_types.clone(),
            max_metadata_len: config.max_metadata_len,
        }
    }
}

/// Strip parameters and lowercase a MIME type
/// (`"Image/JPEG; charset=utf-8"` becomes `"image/jpeg"`).
#[must_use]
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}
