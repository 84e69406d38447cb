//! JSON encoding for HTTP header values.

use std::fmt::Write;

use serde::Serialize;

/// Serialize `value` as JSON that is safe to send in an HTTP header.
///
/// Non-ASCII characters and DEL are written as `\uXXXX` escapes (UTF-16
/// surrogate pairs above the BMP). They can only occur inside JSON strings,
/// so the result parses to the same value.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn header_safe_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    if json.bytes().all(|b| b.is_ascii() && b != 0x7f) {
        return Ok(json);
    }

    let mut out = String::with_capacity(json.len() + 16);
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() && c != '\x7f' {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    Ok(out)
}
