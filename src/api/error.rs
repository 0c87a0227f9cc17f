use crate::api::types::ErrorResponse;
use crate::error::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

const MISSING_URL: &str =
    "Missing file URL. Provide \"url\" parameter in query string (GET) or JSON body (POST)";

/// Errors surfaced by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", MISSING_URL)]
    MissingUrl,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Pipeline(e) if !e.is_client_error() => {
                tracing::error!("Unexpected error in extract endpoint: {}", e);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    file_type: None,
                }
            }
            ApiError::Pipeline(e) => ErrorResponse {
                error: e.to_string(),
                file_type: e.file_type().map(str::to_string),
            },
            ApiError::MissingUrl => ErrorResponse {
                error: self.to_string(),
                file_type: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FetchError};

    #[test]
    fn test_missing_url_message() {
        let err = ApiError::MissingUrl;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.body().error,
            "Missing file URL. Provide \"url\" parameter in query string (GET) or JSON body (POST)"
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::from(PipelineError::Internal("task panicked at src/x.rs".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, "Internal server error");
    }

    #[test]
    fn test_extraction_failure_carries_file_type() {
        let err = ApiError::from(PipelineError::Extraction {
            kind: ErrorKind::NoExtractorMatched,
            message: "Could not extract content with any supported method".to_string(),
            file_type: Some(".pdf".to_string()),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body.file_type.as_deref(), Some(".pdf"));
        assert!(body.error.starts_with("Failed to extract content: "));
    }

    #[test]
    fn test_fetch_failure_is_bad_request() {
        let err = ApiError::from(PipelineError::Fetch(FetchError::Timeout { secs: 30 }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "Request timeout (>30s)");
    }
}
