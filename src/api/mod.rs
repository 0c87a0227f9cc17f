//! HTTP surface for the extraction pipeline.
//!
//! # Endpoints
//!
//! - `GET|POST /extract` - fetch a document by URL and return its text
//! - `GET /health` - extractor availability and limits
//! - `GET /` - API description
//!
//! ```bash
//! curl "http://localhost:5000/extract?url=https://example.com/report.pdf"
//! curl -X POST -H 'Content-Type: application/json' \
//!      -d '{"url":"https://example.com/data.csv"}' http://localhost:5000/extract
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{build_pipeline, create_router, serve};
pub use types::{ApiState, ErrorResponse, ExtractParams, ExtractResponse, HealthResponse, IndexResponse};
