use crate::api::error::ApiError;
use crate::api::types::{ApiState, ExtractParams, ExtractResponse, HealthResponse, IndexResponse};
use crate::constants::SUPPORTED_EXTENSIONS;
use crate::models::FetchRequest;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use std::collections::BTreeMap;

/// `GET /extract?url=...`
pub async fn extract_get(
    State(state): State<ApiState>,
    Query(params): Query<ExtractParams>,
) -> Result<Json<ExtractResponse>, ApiError> {
    run_extraction(&state, params.url).await
}

/// `POST /extract` with a JSON or form body carrying `url`
pub async fn extract_post(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExtractResponse>, ApiError> {
    run_extraction(&state, url_from_body(&headers, &body)).await
}

async fn run_extraction(state: &ApiState, url: Option<String>) -> Result<Json<ExtractResponse>, ApiError> {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => {
            tracing::warn!("Extraction request without URL");
            return Err(ApiError::MissingUrl);
        }
    };

    let extraction = state.pipeline.extract(&FetchRequest::new(url)).await?;
    Ok(Json(extraction.into()))
}

/// JSON body first, then url-encoded form fields
fn url_from_body(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();

    if content_type.contains("json") {
        if let Ok(params) = serde_json::from_slice::<ExtractParams>(body) {
            if params.url.is_some() {
                return params.url;
            }
        }
    }

    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

/// `GET /`
pub async fn index(State(state): State<ApiState>) -> Json<IndexResponse> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert(
        "/extract".to_string(),
        "Extract content from file URL (GET or POST with url parameter)".to_string(),
    );
    endpoints.insert("/health".to_string(), "Health check endpoint".to_string());

    Json(IndexResponse {
        message: "File Extractor API".to_string(),
        endpoints,
        supported_formats: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        max_file_size_mb: state.config.fetch.max_file_size_mb(),
    })
}
