//! Name and metadata sanitization.

/// Longest sanitized file name placed in a remote path.
const MAX_STORED_NAME_LEN: usize = 128;

/// Sanitize user-supplied naming metadata (e.g. an order id).
///
/// Keeps only `[A-Za-z0-9_-]` and truncates to `max_len`. Returns `None`
/// when nothing survives.
#[must_use]
pub fn sanitize_metadata(raw: &str, max_len: usize) -> Option<String> {
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(max_len)
        .collect();

    (!sanitized.is_empty()).then_some(sanitized)
}

/// Sanitize filename for a remote path.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
/// Over-long names are shortened with the extension kept.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.len() <= MAX_STORED_NAME_LEN {
        return sanitized;
    }

    // ASCII only from here on, byte slicing is safe.
    match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < 16 => {
            let keep = MAX_STORED_NAME_LEN - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        _ => sanitized[..MAX_STORED_NAME_LEN].to_string(),
    }
}

/// Last path component of a client-supplied name.
///
/// Returns `None` for empty names and for `.`/`..` components.
#[must_use]
pub fn base_name(name: &str) -> Option<&str> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last)
}

/// Lowercased extension without the dot.
#[must_use]
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}
