pub mod http;
pub mod scratch;
pub mod r#trait;

pub use http::HttpFetcher;
pub use r#trait::Fetcher;
pub use scratch::ScratchFile;
