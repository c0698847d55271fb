use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use crate::error::{AnalysisError, ExtractionError, FetchError};

pub fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::Validation(_) => StatusCode::BAD_REQUEST,
        AnalysisError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AnalysisError::Fetch(FetchError::Blocked(_)) => StatusCode::FORBIDDEN,
        AnalysisError::Fetch(FetchError::NotFound(_)) => StatusCode::NOT_FOUND,
        AnalysisError::Fetch(FetchError::Timeout(_)) | AnalysisError::Timeout => {
            StatusCode::GATEWAY_TIMEOUT
        }
        AnalysisError::Fetch(FetchError::Network(_)) => StatusCode::BAD_GATEWAY,
        AnalysisError::Extraction(ExtractionError::NoIngredientsFound) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AnalysisError::Config(_) | AnalysisError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Error response: `{detail, reason}`, or `{success: false, error, reason}`
/// for the extension endpoints
#[derive(Debug)]
pub struct ApiError {
    error: AnalysisError,
    envelope: bool,
}

impl ApiError {
    pub fn plain(error: AnalysisError) -> Self {
        Self {
            error,
            envelope: false,
        }
    }

    pub fn envelope(error: AnalysisError) -> Self {
        Self {
            error,
            envelope: true,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        Self::plain(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        if status.is_server_error() {
            error!("Request failed: {}", self.error);
        }

        let detail = self.error.detail();
        let reason = self.error.reason();
        let body = if self.envelope {
            json!({
                "success": false,
                "error": detail,
                "reason": reason,
                "fallback_message": "Could not analyze this recipe. Try a different recipe page.",
            })
        } else {
            json!({ "detail": detail, "reason": reason })
        };

        let mut response = (status, Json(body)).into_response();
        if let AnalysisError::RateLimited { retry_after_secs } = self.error {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AnalysisError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&FetchError::Blocked("403".into()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ExtractionError::NoIngredientsFound.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(&AnalysisError::Timeout), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::plain(AnalysisError::RateLimited {
            retry_after_secs: 12,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
