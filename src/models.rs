use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use tempfile::TempPath;
use url::Url;

/// A request to extract the document behind `url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A URL that passed the SSRF policy. Only `UrlPolicy::validate` hands these out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    url: Url,
    host: String,
}

impl ValidatedUrl {
    pub(crate) fn from_checked(url: Url, host: String) -> Self {
        Self { url, host }
    }

    /// Skip the policy; lets fetcher tests talk to a loopback server
    #[cfg(test)]
    pub(crate) fn unchecked(raw: &str) -> Self {
        let url = Url::parse(raw).expect("test URL must parse");
        let host = url.host_str().unwrap_or_default().to_string();
        Self { url, host }
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Normalized host (lower-cased, no IPv6 brackets, no trailing dot)
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn raw(&self) -> &str {
        self.url.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Supported document formats, in probe order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    Pdf,
    Docx,
    Doc,
    Csv,
    Txt,
}

impl FormatTag {
    /// Fallback probe order. Txt decodes almost anything, so it stays last.
    pub const PROBE_ORDER: [FormatTag; 5] = [
        FormatTag::Pdf,
        FormatTag::Docx,
        FormatTag::Doc,
        FormatTag::Csv,
        FormatTag::Txt,
    ];

    /// Dotted extension used on the wire (".pdf")
    pub fn extension(&self) -> &'static str {
        match self {
            FormatTag::Pdf => ".pdf",
            FormatTag::Docx => ".docx",
            FormatTag::Doc => ".doc",
            FormatTag::Csv => ".csv",
            FormatTag::Txt => ".txt",
        }
    }

    /// Parse "pdf", ".PDF" and friends
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "pdf" => Some(FormatTag::Pdf),
            "docx" => Some(FormatTag::Docx),
            "doc" => Some(FormatTag::Doc),
            "csv" => Some(FormatTag::Csv),
            "txt" => Some(FormatTag::Txt),
            _ => None,
        }
    }

    /// Short name used in health flags and logs
    pub fn name(&self) -> &'static str {
        &self.extension()[1..]
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Downloaded bytes plus the hints that came with them.
///
/// The payload owns its scratch file; `release` removes it.
#[derive(Debug)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    pub declared_extension: Option<String>,
    pub declared_content_type: Option<String>,
    pub size_bytes: u64,
    scratch: Option<TempPath>,
}

impl FetchedPayload {
    pub fn new(
        bytes: Vec<u8>,
        declared_extension: Option<String>,
        declared_content_type: Option<String>,
        scratch: TempPath,
    ) -> Self {
        let size_bytes = bytes.len() as u64;
        Self {
            bytes,
            declared_extension,
            declared_content_type,
            size_bytes,
            scratch: Some(scratch),
        }
    }

    /// Path of the scratch file backing this payload
    pub fn scratch_path(&self) -> Option<&std::path::Path> {
        self.scratch.as_deref()
    }

    /// Delete the scratch file. Failures are logged, never returned.
    pub fn release(mut self) {
        if let Some(path) = self.scratch.take() {
            let shown = path.display().to_string();
            if let Err(e) = path.close() {
                tracing::warn!("Failed to delete temp file {}: {}", shown, e);
            } else {
                tracing::trace!("released scratch file {}", shown);
            }
        }
    }
}

/// Result of running the resolver over one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success {
        text: String,
        format_used: FormatTag,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        format_attempted: Option<String>,
    },
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }
}

/// Successful pipeline result
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Extraction {
    pub content: String,
    pub file_type: String,
    /// UTF-8 byte length of `content`
    pub content_length: usize,
}

impl Extraction {
    pub fn new(content: String, format: FormatTag) -> Self {
        let content_length = content.len();
        Self {
            content,
            file_type: format.extension().to_string(),
            content_length,
        }
    }
}
