use crate::error::{PipelineError, Result};
use crate::extractor::ExtractorSet;
use crate::fetcher::Fetcher;
use crate::logging::truncate_for_log;
use crate::models::{Extraction, ExtractionOutcome, FetchRequest};
use crate::resolver;
use crate::validator::UrlPolicy;
use std::sync::Arc;

/// Validate → fetch → resolve, with the scratch file torn down on every path
#[derive(Clone)]
pub struct Pipeline {
    policy: Arc<UrlPolicy>,
    fetcher: Arc<dyn Fetcher>,
    extractors: Arc<ExtractorSet>,
}

impl Pipeline {
    pub fn new(policy: Arc<UrlPolicy>, fetcher: Arc<dyn Fetcher>, extractors: Arc<ExtractorSet>) -> Self {
        Self {
            policy,
            fetcher,
            extractors,
        }
    }

    pub fn extractors(&self) -> &ExtractorSet {
        &self.extractors
    }

    /// Run one extraction request end to end
    pub async fn extract(&self, request: &FetchRequest) -> Result<Extraction> {
        let url = self.policy.validate(&request.url).map_err(|reason| {
            tracing::warn!("Invalid URL rejected: {}", truncate_for_log(&request.url));
            PipelineError::Rejected(reason)
        })?;

        tracing::info!("Extraction request for URL: {}...", truncate_for_log(url.raw()));

        let payload = self.fetcher.fetch(&url).await.map_err(|e| {
            tracing::error!("Download failed: {}", e);
            PipelineError::Fetch(e)
        })?;

        let declared = payload.declared_extension.clone();
        let extractors = self.extractors.clone();

        // A panic in here drops the payload on the blocking thread, and its
        // TempPath removes the scratch file
        let (outcome, payload) = tokio::task::spawn_blocking(move || {
            let outcome = resolver::resolve(&extractors, &payload);
            (outcome, payload)
        })
        .await
        .map_err(|e| {
            tracing::error!("Unexpected error in extraction task: {}", e);
            PipelineError::Internal(e.to_string())
        })?;

        payload.release();

        match outcome {
            ExtractionOutcome::Success { text, format_used } => {
                let extraction = Extraction::new(text, format_used);
                tracing::info!(
                    "Successfully extracted {} file, length: {}",
                    extraction.file_type,
                    extraction.content_length
                );
                Ok(extraction)
            }
            ExtractionOutcome::Failure {
                kind,
                message,
                format_attempted,
            } => {
                tracing::error!("Extraction failed: {}", message);
                Err(PipelineError::Extraction {
                    kind,
                    message,
                    file_type: format_attempted.or(declared),
                })
            }
        }
    }
}
