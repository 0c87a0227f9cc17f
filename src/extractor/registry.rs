use crate::config::ExtractorsConfig;
use crate::extractor::{
    CsvExtractor, DocExtractor, DocxExtractor, Extractor, PdfExtractor, TxtExtractor,
};
use crate::models::FormatTag;
use std::sync::Arc;

/// One entry of the capability registry
#[derive(Clone)]
pub struct ExtractorDescriptor {
    pub format: FormatTag,
    pub available: bool,
    pub extractor: Arc<dyn Extractor>,
}

impl std::fmt::Debug for ExtractorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorDescriptor")
            .field("format", &self.format)
            .field("available", &self.available)
            .finish()
    }
}

/// Fixed, ordered set of extractors. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct ExtractorSet {
    descriptors: Vec<ExtractorDescriptor>,
}

impl ExtractorSet {
    pub fn new(descriptors: Vec<ExtractorDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Built-in extractors in probe order, minus the ones disabled in config
    pub fn from_config(config: &ExtractorsConfig) -> Self {
        let descriptors = FormatTag::PROBE_ORDER
            .iter()
            .map(|&format| {
                let available = config.is_enabled(format);
                if !available {
                    tracing::info!("{} extraction disabled by configuration", format);
                }
                ExtractorDescriptor {
                    format,
                    available,
                    extractor: builtin(format),
                }
            })
            .collect();
        Self::new(descriptors)
    }

    /// Replace the extractor registered for its format
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        let format = extractor.format();
        match self.descriptors.iter_mut().find(|d| d.format == format) {
            Some(descriptor) => descriptor.extractor = extractor,
            None => self.descriptors.push(ExtractorDescriptor {
                format,
                available: true,
                extractor,
            }),
        }
        self
    }

    pub fn get(&self, format: FormatTag) -> Option<&ExtractorDescriptor> {
        self.descriptors.iter().find(|d| d.format == format)
    }

    pub fn is_available(&self, format: FormatTag) -> bool {
        self.get(format).map(|d| d.available).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractorDescriptor> {
        self.descriptors.iter()
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::from_config(&ExtractorsConfig::default())
    }
}

fn builtin(format: FormatTag) -> Arc<dyn Extractor> {
    match format {
        FormatTag::Pdf => Arc::new(PdfExtractor::new()),
        FormatTag::Docx => Arc::new(DocxExtractor::new()),
        FormatTag::Doc => Arc::new(DocExtractor::new()),
        FormatTag::Csv => Arc::new(CsvExtractor::new()),
        FormatTag::Txt => Arc::new(TxtExtractor::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_order_and_availability() {
        let set = ExtractorSet::default();
        let order: Vec<FormatTag> = set.iter().map(|d| d.format).collect();
        assert_eq!(order, FormatTag::PROBE_ORDER.to_vec());
        assert!(set.iter().all(|d| d.available));
        assert!(set.iter().all(|d| d.extractor.format() == d.format));
    }

    #[test]
    fn test_disabled_format_is_unavailable() {
        let config = ExtractorsConfig {
            disabled: vec![".doc".to_string()],
        };
        let set = ExtractorSet::from_config(&config);
        assert!(!set.is_available(FormatTag::Doc));
        assert!(set.is_available(FormatTag::Docx));
        assert!(set.get(FormatTag::Doc).is_some());
    }

    #[test]
    fn test_with_extractor_replaces_in_place() {
        let set = ExtractorSet::default().with_extractor(Arc::new(TxtExtractor::new()));
        assert_eq!(set.iter().count(), 5);
        assert_eq!(set.iter().last().map(|d| d.format), Some(FormatTag::Txt));
    }
}
