use crate::error::ExtractionError;
use crate::models::FormatTag;

/// Trait for extractors that turn raw document bytes into plain text
pub trait Extractor: Send + Sync {
    /// Format this extractor handles
    fn format(&self) -> FormatTag;

    /// Extract text content from the payload bytes
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Check if this extractor supports the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        FormatTag::from_extension(ext) == Some(self.format())
    }
}
