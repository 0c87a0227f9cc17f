use crate::error::FetchError;
use crate::models::{FetchedPayload, ValidatedUrl};

/// Trait for retrieving a remote document into a request-scoped payload
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url`, honouring the fetcher's size and time limits
    async fn fetch(&self, url: &ValidatedUrl) -> Result<FetchedPayload, FetchError>;
}
