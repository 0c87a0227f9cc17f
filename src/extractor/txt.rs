use crate::error::ExtractionError;
use crate::extractor::encoding::{decode_first, TXT_ENCODINGS};
use crate::extractor::r#trait::Extractor;
use crate::models::FormatTag;

/// Plain text extractor
#[derive(Debug, Default)]
pub struct TxtExtractor;

impl TxtExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TxtExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Txt
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let (text, encoding) = decode_first(bytes, &TXT_ENCODINGS)?;
        tracing::debug!("decoded text as {}", encoding.name());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extractor_supports_txt() {
        let extractor = TxtExtractor::new();
        assert!(extractor.supports_extension("txt"));
        assert!(extractor.supports_extension(".TXT"));
        assert!(!extractor.supports_extension("csv"));
    }

    #[test]
    fn test_ascii_round_trip() {
        let body = "Hello, this is a test text file.\nIt has multiple lines.";
        assert_eq!(TxtExtractor::new().extract(body.as_bytes()).unwrap(), body);
    }

    #[test]
    fn test_latin1_text() {
        assert_eq!(TxtExtractor::new().extract(b"na\xefve r\xe9sum\xe9").unwrap(), "naïve résumé");
    }

    #[test]
    fn test_binary_refused() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert!(matches!(
            TxtExtractor::new().extract(&bytes),
            Err(ExtractionError::EncodingExhausted(_))
        ));
    }
}
