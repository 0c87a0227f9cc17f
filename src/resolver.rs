//! Picks the extractor for a payload: declared format first, then fallback
//! probing across everything still available.

use crate::error::ExtractionError;
use crate::extractor::{ExtractorDescriptor, ExtractorSet};
use crate::models::{ExtractionOutcome, FetchedPayload, FormatTag};

/// Run the declared extractor, then probe the rest in set order
pub fn resolve(set: &ExtractorSet, payload: &FetchedPayload) -> ExtractionOutcome {
    let declared = payload
        .declared_extension
        .as_deref()
        .and_then(FormatTag::from_extension);

    let mut tried: Vec<FormatTag> = Vec::new();

    if let Some(format) = declared {
        match set.get(format) {
            Some(descriptor) if descriptor.available => {
                tried.push(format);
                if let Some(text) = attempt(descriptor, &payload.bytes) {
                    return ExtractionOutcome::Success {
                        text,
                        format_used: format,
                    };
                }
            }
            _ => tracing::debug!("declared format {} is not available", format),
        }
    }

    for descriptor in set.iter() {
        if !descriptor.available || tried.contains(&descriptor.format) {
            continue;
        }
        tried.push(descriptor.format);
        if let Some(text) = attempt(descriptor, &payload.bytes) {
            tracing::info!("Detected file type as {} via content analysis", descriptor.format);
            return ExtractionOutcome::Success {
                text,
                format_used: descriptor.format,
            };
        }
    }

    let format_attempted = tried
        .last()
        .map(|f| f.extension().to_string())
        .or_else(|| payload.declared_extension.clone());

    ExtractionOutcome::Failure {
        kind: ExtractionError::NoExtractorMatched.kind(),
        message: ExtractionError::NoExtractorMatched.to_string(),
        format_attempted,
    }
}

/// One probe; only non-blank text counts as a match
fn attempt(descriptor: &ExtractorDescriptor, bytes: &[u8]) -> Option<String> {
    match descriptor.extractor.extract(bytes) {
        Ok(text) if !text.trim().is_empty() => {
            tracing::debug!("Extraction with {} succeeded", descriptor.format);
            Some(text)
        }
        Ok(_) => {
            tracing::debug!("Extraction with {} failed: {}", descriptor.format, ExtractionError::NoContent);
            None
        }
        Err(e) => {
            tracing::debug!("Extraction with {} failed: {}", descriptor.format, e);
            None
        }
    }
}
