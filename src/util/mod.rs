//! Small utility helpers for URL encoding, text normalization, and number formatting.
//!
//! The functions in this module are intentionally lightweight to keep the
//! filtering hot paths fast. They are used by the search pipeline, the compact
//! URL codec, and the settings loader.

pub mod config;

use std::fmt::{self, Write};

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// What: Percent-encode a string for use in URLs according to RFC 3986.
///
/// Inputs:
/// - `input`: String to encode.
///
/// Output:
/// - Returns a percent-encoded string where reserved characters are escaped.
///
/// Details:
/// - Unreserved characters as per RFC 3986 (`A-Z`, `a-z`, `0-9`, `-`, `.`, `_`, `~`) are left as-is.
/// - Space is encoded as `%20` (not `+`).
/// - All other bytes are encoded as two uppercase hexadecimal digits prefixed by `%`.
/// - Operates on raw bytes from the input string; any non-ASCII bytes are hex-escaped.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => {
                out.push('%');
                let _ = write!(out, "{b:02X}");
            }
        }
    }
    out
}

/// What: Error raised when a percent-encoded string cannot be decoded.
///
/// Inputs: Produced by [`percent_decode`].
///
/// Output: Implements `Display`/`Error` so callers can propagate it with `?`.
///
/// Details:
/// - `position` is the byte offset of the offending `%` escape, or of the
///   first byte of an invalid UTF-8 sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentDecodeError {
    /// Byte offset of the malformed input.
    pub position: usize,
    /// Short description of the failure.
    pub reason: &'static str,
}

impl fmt::Display for PercentDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid percent-encoding at byte {}: {}",
            self.position, self.reason
        )
    }
}

impl std::error::Error for PercentDecodeError {}

/// What: Decode a percent-encoded string produced by [`percent_encode`] or a browser.
///
/// Inputs:
/// - `input`: Encoded text.
///
/// Output:
/// - `Ok(String)` with escapes resolved, or `Err(PercentDecodeError)` for truncated
///   escapes, non-hex digits, or decoded bytes that are not valid UTF-8.
///
/// # Errors
/// - Returns `Err(PercentDecodeError)` when an escape is malformed or the result is not UTF-8.
///
/// Details:
/// - `+` is kept literally; the codec always writes spaces as `%20`.
pub fn percent_decode(input: &str) -> Result<String, PercentDecodeError> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
            let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
            match (hi, lo) {
                (Some(h), Some(l)) => {
                    out.push((h << 4) | l);
                    i += 3;
                }
                _ => {
                    return Err(PercentDecodeError {
                        position: i,
                        reason: "malformed escape",
                    });
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| PercentDecodeError {
        position: e.utf8_error().valid_up_to(),
        reason: "decoded bytes are not UTF-8",
    })
}

/// Map one ASCII hex digit to its value.
const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// What: Normalize free text for substring search.
///
/// Inputs:
/// - `input`: Raw text (query term or record field).
///
/// Output:
/// - Lowercased text with accents removed (`"Überwolf"` becomes `"uberwolf"`).
///
/// Details:
/// - Decomposes to NFD and drops combining marks, then lowercases.
#[must_use]
pub fn normalize_search_text(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// What: Render a filter bound compactly for URLs and logs.
///
/// Inputs:
/// - `value`: Numeric bound.
///
/// Output:
/// - Integral values print without a fractional part (`10`), others use the
///   shortest round-trip representation (`0.5`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
