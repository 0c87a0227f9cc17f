//! Strict text decoders shared by the CSV and TXT extractors.
//!
//! Each decoder either produces text that plausibly is text or refuses, so a
//! fallback list of encodings behaves as a real probe instead of always
//! succeeding on the first single-byte charset.

use crate::error::ExtractionError;
use encoding_rs::WINDOWS_1252;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes windows-1252 leaves undefined
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// UTF-8 with an optional leading byte-order mark
    Utf8Sig,
    Latin1,
    Windows1252,
}

/// Order tried for plain text
pub const TXT_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

/// Order tried for CSV
pub const CSV_ENCODINGS: [TextEncoding; 4] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode `bytes`, or `None` when they are not valid text in this encoding
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let text = match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                std::str::from_utf8(bytes).ok()?.to_string()
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok()?.to_string()
            }
            TextEncoding::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    return None;
                }
                bytes.iter().map(|&b| b as char).collect()
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)?
                    .into_owned()
            }
        };

        if has_binary_controls(&text) {
            return None;
        }
        Some(text)
    }
}

/// C0 controls other than tab, newline, carriage return and form feed
fn has_binary_controls(text: &str) -> bool {
    text.chars()
        .any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r' | '\u{0c}'))
}

/// Decode with the first encoding in `order` that accepts the bytes
pub fn decode_first(bytes: &[u8], order: &[TextEncoding]) -> Result<(String, TextEncoding), ExtractionError> {
    for encoding in order {
        if let Some(text) = encoding.decode(bytes) {
            return Ok((text, *encoding));
        }
        tracing::trace!("payload is not {}", encoding.name());
    }
    Err(ExtractionError::EncodingExhausted(format!(
        "Could not decode text with any of: {}",
        order.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
    )))
}
