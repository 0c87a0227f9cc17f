use crate::constants::MAX_DOCX_PART_SIZE;
use crate::error::ExtractionError;
use crate::extractor::catch_parser_panic;
use crate::extractor::r#trait::Extractor;
use crate::models::FormatTag;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX extractor: paragraph text from the main document part
#[derive(Debug)]
pub struct DocxExtractor {
    max_part_size: u64,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::with_limit(MAX_DOCX_PART_SIZE)
    }

    /// Cap on the inflated size of `word/document.xml`
    pub fn with_limit(max_part_size: u64) -> Self {
        Self { max_part_size }
    }

    fn read_document_part(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::ParseFailure(format!("DOCX parsing error: {}", e)))?;
        let part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            ExtractionError::ParseFailure(format!("DOCX parsing error: {}: {}", DOCUMENT_PART, e))
        })?;

        let oversize = || {
            ExtractionError::ParseFailure(format!(
                "DOCX parsing error: {} exceeds {} bytes",
                DOCUMENT_PART, self.max_part_size
            ))
        };
        // The header size is not trusted; the read itself is capped below
        if part.size() > self.max_part_size {
            return Err(oversize());
        }

        let mut xml = String::new();
        part.take(self.max_part_size + 1)
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::ParseFailure(format!("DOCX parsing error: {}", e)))?;
        if xml.len() as u64 > self.max_part_size {
            return Err(oversize());
        }
        Ok(xml)
    }

    /// Walk `w:p` paragraphs; runs contribute `w:t` text, tabs and breaks
    fn paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        // Text boxes nest paragraphs inside runs, hence a stack
        let mut open: Vec<String> = Vec::new();
        let mut done = Vec::new();
        let mut run_depth = 0usize;
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"w:p" => open.push(String::new()),
                    b"w:r" => run_depth += 1,
                    b"w:t" => in_text = true,
                    name => push_run_break(&mut open, run_depth, name),
                },
                Ok(Event::Empty(e)) => push_run_break(&mut open, run_depth, e.name().as_ref()),
                Ok(Event::Text(t)) if in_text => {
                    let text = t.unescape().map_err(|e| {
                        ExtractionError::ParseFailure(format!("DOCX parsing error: {}", e))
                    })?;
                    if let Some(current) = open.last_mut() {
                        current.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:r" => run_depth = run_depth.saturating_sub(1),
                    b"w:p" => {
                        if let Some(paragraph) = open.pop() {
                            if !paragraph.trim().is_empty() {
                                done.push(paragraph);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ExtractionError::ParseFailure(format!(
                        "DOCX parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        Ok(done)
    }
}

fn push_run_break(open: &mut [String], run_depth: usize, name: &[u8]) {
    if run_depth == 0 {
        return;
    }
    let Some(current) = open.last_mut() else {
        return;
    };
    match name {
        b"w:tab" => current.push('\t'),
        b"w:br" | b"w:cr" => current.push('\n'),
        _ => {}
    }
}

impl Extractor for DocxExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        catch_parser_panic(FormatTag::Docx, || {
            let xml = self.read_document_part(bytes)?;
            let paragraphs = Self::paragraphs(&xml)?;
            Ok(paragraphs.join("\n"))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Wrap `body` (the inside of `w:body`) into a minimal DOCX package
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_extractor_supports_docx() {
        assert!(DocxExtractor::new().supports_extension("docx"));
        assert!(!DocxExtractor::new().supports_extension("doc"));
    }

    #[test]
    fn test_docx_paragraphs() {
        let bytes = build_docx(
            "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space=\"preserve\"> World</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p>",
        );
        assert_eq!(DocxExtractor::new().extract(&bytes).unwrap(), "Hello World\nSecond & last");
    }

    #[test]
    fn test_docx_skips_empty_paragraphs() {
        let bytes = build_docx("<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>two</w:t></w:r></w:p>");
        assert_eq!(DocxExtractor::new().extract(&bytes).unwrap(), "one\ntwo");
    }

    #[test]
    fn test_docx_tabs_and_breaks() {
        let bytes = build_docx(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>",
        );
        assert_eq!(DocxExtractor::new().extract(&bytes).unwrap(), "a\tb\nc");
    }

    #[test]
    fn test_docx_not_a_zip() {
        let err = DocxExtractor::new().extract(b"plain text, not a package").unwrap_err();
        assert!(matches!(err, ExtractionError::ParseFailure(_)));
    }

    #[test]
    fn test_docx_missing_document_part() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("readme.txt", zip::write::FileOptions::default()).unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = DocxExtractor::new().extract(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::ParseFailure(_)));
    }

    #[test]
    fn test_docx_inflated_part_over_limit() {
        let body = "<w:p><w:r><w:t>aaaaaaaaaaaaaaaa</w:t></w:r></w:p>".repeat(20_000);
        let bytes = build_docx(&body);
        assert!(bytes.len() < 64 * 1024);

        let err = DocxExtractor::with_limit(64 * 1024).extract(&bytes).unwrap_err();
        match err {
            ExtractionError::ParseFailure(msg) => assert!(msg.contains("exceeds 65536 bytes"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }

        let text = DocxExtractor::new().extract(&bytes).unwrap();
        assert_eq!(text.lines().count(), 20_000);
    }
}
