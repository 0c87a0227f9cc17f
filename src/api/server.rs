use crate::api::handlers;
use crate::api::types::ApiState;
use crate::config::Config;
use crate::extractor::ExtractorSet;
use crate::fetcher::HttpFetcher;
use crate::pipeline::Pipeline;
use crate::validator::UrlPolicy;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;

/// Build the production pipeline from configuration
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let policy = Arc::new(UrlPolicy::default());
    let fetcher = HttpFetcher::new(config.fetch.clone(), policy.clone())
        .context("Failed to initialize HTTP fetcher")?;
    let extractors = ExtractorSet::from_config(&config.extractors);

    Ok(Pipeline::new(policy, Arc::new(fetcher), Arc::new(extractors)))
}

/// Router over an already-built pipeline
pub fn create_router(pipeline: Arc<Pipeline>, config: Arc<Config>) -> Router {
    let state = ApiState { pipeline, config };

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/extract",
            get(handlers::extract_get).post(handlers::extract_post),
        )
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = Arc::new(config);
    let pipeline = Arc::new(build_pipeline(&config)?);
    let app = create_router(pipeline, config.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "File Extractor API listening on {} (max file size {:.1}MB)",
        addr,
        config.fetch.max_file_size_mb()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
