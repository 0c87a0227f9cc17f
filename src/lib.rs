pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod utils;
pub mod validator;

pub use config::Config;
pub use error::{ExtractionError, FetchError, PipelineError, RejectionReason};
pub use extractor::{Extractor, ExtractorSet};
pub use fetcher::{Fetcher, HttpFetcher};
pub use models::{Extraction, FetchRequest, FormatTag};
pub use pipeline::Pipeline;
pub use validator::UrlPolicy;
