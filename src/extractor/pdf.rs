use crate::error::ExtractionError;
use crate::extractor::catch_parser_panic;
use crate::extractor::r#trait::Extractor;
use crate::models::FormatTag;
use lopdf::Document;

/// PDF text extractor: lopdf page walk, pdf-extract as the second engine
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text page by page using lopdf
    fn extract_with_lopdf(bytes: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ExtractionError::ParseFailure(format!("PDF parsing error: {}", e)))?;

        let mut pages = Vec::new();
        for (number, _) in doc.get_pages() {
            match doc.extract_text(&[number]) {
                Ok(text) => {
                    let text = text.trim_end();
                    if !text.trim().is_empty() {
                        pages.push(text.to_string());
                    }
                }
                Err(e) => {
                    tracing::debug!("no text on PDF page {}: {}", number, e);
                }
            }
        }

        Ok(pages.join("\n"))
    }

    /// Extract text using pdf-extract (handles more font encodings)
    fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::ParseFailure(format!("PDF parsing error: {}", e)))
    }
}

impl Extractor for PdfExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let primary = catch_parser_panic(FormatTag::Pdf, || Self::extract_with_lopdf(bytes));

        match &primary {
            Ok(text) if !text.trim().is_empty() => return Ok(text.clone()),
            Ok(_) => tracing::debug!("lopdf found no text, trying pdf-extract"),
            Err(e) => tracing::debug!("lopdf failed ({}), trying pdf-extract", e),
        }

        let secondary = catch_parser_panic(FormatTag::Pdf, || Self::extract_with_pdf_extract(bytes));
        match (primary, secondary) {
            (_, Ok(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => {
                tracing::debug!("pdf-extract failed: {}", e);
                Err(ExtractionError::NoContent)
            }
            (Ok(_), Ok(_)) => Err(ExtractionError::NoContent),
        }
    }
}
