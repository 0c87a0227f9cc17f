pub mod csv;
pub mod doc;
pub mod docx;
pub mod encoding;
pub mod pdf;
pub mod registry;
pub mod r#trait;
pub mod txt;

pub use self::csv::CsvExtractor;
pub use self::doc::DocExtractor;
pub use self::docx::DocxExtractor;
pub use self::pdf::PdfExtractor;
pub use self::registry::{ExtractorDescriptor, ExtractorSet};
pub use self::r#trait::Extractor;
pub use self::txt::TxtExtractor;

use crate::error::ExtractionError;
use crate::models::FormatTag;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run a third-party parser, turning a panic into `ParseFailure`
pub(crate) fn catch_parser_panic<F>(format: FormatTag, parse: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError>,
{
    match catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!("{} parser panicked: {}", format, detail);
            Err(ExtractionError::ParseFailure(format!(
                "{} parser crashed: {}",
                format.name(),
                detail
            )))
        }
    }
}
