use crate::error::ExtractionError;
use crate::extractor::encoding::{TextEncoding, CSV_ENCODINGS};
use crate::extractor::r#trait::Extractor;
use crate::models::FormatTag;

/// CSV extractor: rows flattened to comma-joined lines
#[derive(Debug, Default)]
pub struct CsvExtractor;

impl CsvExtractor {
    pub fn new() -> Self {
        Self
    }

    fn flatten(text: &str) -> Result<String, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Only a lone empty field is a blank line; `,,` is a row of empty cells
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }
            lines.push(record.iter().collect::<Vec<_>>().join(","));
        }
        Ok(lines.join("\n"))
    }

    fn try_encoding(encoding: TextEncoding, bytes: &[u8]) -> Option<String> {
        let text = encoding.decode(bytes)?;
        match Self::flatten(&text) {
            Ok(flat) => Some(flat),
            Err(e) => {
                tracing::debug!("CSV parse failed as {}: {}", encoding.name(), e);
                None
            }
        }
    }
}

impl Extractor for CsvExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Csv
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        for encoding in CSV_ENCODINGS {
            if let Some(flat) = Self::try_encoding(encoding, bytes) {
                tracing::debug!("parsed CSV as {}", encoding.name());
                return Ok(flat);
            }
        }
        Err(ExtractionError::EncodingExhausted(
            "Could not decode CSV file with any supported encoding".to_string(),
        ))
    }
}
