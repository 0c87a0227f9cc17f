use crate::config::Config;
use crate::models::{Extraction, FormatTag};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// `url` as a query parameter, JSON field or form field
#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExtractResponse {
    pub success: bool,
    pub content: String,
    pub file_type: String,
    pub content_length: usize,
}

impl From<Extraction> for ExtractResponse {
    fn from(extraction: Extraction) -> Self {
        Self {
            success: true,
            content: extraction.content,
            file_type: extraction.file_type,
            content_length: extraction.content_length,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub pdf_support: bool,
    pub docx_support: bool,
    pub doc_support: bool,
    pub csv_support: bool,
    pub txt_support: bool,
    pub max_file_size_mb: f64,
}

impl HealthResponse {
    pub fn from_state(state: &ApiState) -> Self {
        let extractors = state.pipeline.extractors();
        Self {
            status: "healthy".to_string(),
            pdf_support: extractors.is_available(FormatTag::Pdf),
            docx_support: extractors.is_available(FormatTag::Docx),
            doc_support: extractors.is_available(FormatTag::Doc),
            csv_support: extractors.is_available(FormatTag::Csv),
            txt_support: extractors.is_available(FormatTag::Txt),
            max_file_size_mb: state.config.fetch.max_file_size_mb(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexResponse {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
    pub supported_formats: Vec<String>,
    pub max_file_size_mb: f64,
}
