//! Error taxonomy for the extraction pipeline.

use serde::Serialize;
use thiserror::Error;

/// Why a URL was refused by the policy checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("URL must be a non-empty string")]
    Empty,

    #[error("URL too long (max {max} characters)")]
    TooLong { max: usize },

    #[error("Invalid URL format: {0}")]
    MalformedUrl(String),

    #[error("Only {allowed} URLs are allowed")]
    SchemeNotAllowed { scheme: String, allowed: String },

    #[error("missing hostname")]
    MissingHost,

    #[error("Internal URLs are not allowed")]
    BlockedHost(String),

    #[error("Private IP addresses are not allowed")]
    PrivateAddress(String),
}

/// Download failures.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timeout (>{secs}s)")]
    Timeout { secs: u64 },

    #[error("Failed to download file: HTTP {code}")]
    HttpStatus { code: u16 },

    #[error("File too large. Maximum size: {:.1}MB", as_mib(.limit))]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to download file: {detail}")]
    Transport { detail: String },

    #[error("Invalid URL: {0}")]
    Blocked(RejectionReason),
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Transport {
            detail: format!("scratch storage: {}", err),
        }
    }
}

fn as_mib(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Failure of a single extractor or of the whole probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{0}")]
    EncodingExhausted(String),

    #[error("{0}")]
    ParseFailure(String),

    #[error("no text content")]
    NoContent,

    #[error("Could not extract content with any supported method")]
    NoExtractorMatched,

    #[error("{0} extraction is not available")]
    Unavailable(String),
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::EncodingExhausted(_) => ErrorKind::EncodingExhausted,
            ExtractionError::ParseFailure(_) => ErrorKind::ParseFailure,
            ExtractionError::NoContent => ErrorKind::NoContent,
            ExtractionError::NoExtractorMatched => ErrorKind::NoExtractorMatched,
            ExtractionError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

/// Flat discriminant of [`ExtractionError`], carried by failed outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EncodingExhausted,
    ParseFailure,
    NoContent,
    NoExtractorMatched,
    Unavailable,
}

/// Everything the pipeline can report back to its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid URL: {0}")]
    Rejected(#[from] RejectionReason),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to extract content: {message}")]
    Extraction {
        kind: ErrorKind,
        message: String,
        file_type: Option<String>,
    },

    /// A defect inside the pipeline; the detail is for logs only
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Format tag known at the time of failure, if any
    pub fn file_type(&self) -> Option<&str> {
        match self {
            PipelineError::Extraction { file_type, .. } => file_type.as_deref(),
            _ => None,
        }
    }

    /// Whether the caller is at fault (400) rather than the service (500)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PipelineError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
