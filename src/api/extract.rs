//! Request extractors whose rejections use the JSON error bodies instead of
//! axum's plain-text ones.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};

use super::response::ApiError;
use crate::error::AnalysisError;

/// JSON body; rejections answer with `{detail, reason}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string; rejections answer with `{detail, reason}`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Query string for the extension endpoints; rejections answer with the
/// `{success: false, ..}` envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(EnvelopeRejection))]
pub struct ExtensionQuery<T>(pub T);

pub struct EnvelopeRejection(ApiError);

impl IntoResponse for EnvelopeRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl From<QueryRejection> for EnvelopeRejection {
    fn from(rejection: QueryRejection) -> Self {
        Self(ApiError::envelope(map_query_rejection(rejection)))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::plain(map_query_rejection(rejection))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::plain(map_json_rejection(rejection))
    }
}

fn map_query_rejection(rejection: QueryRejection) -> AnalysisError {
    AnalysisError::Validation(format!("Invalid query parameters: {}", rejection.body_text()))
}

fn map_json_rejection(rejection: JsonRejection) -> AnalysisError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            AnalysisError::Validation(format!("Invalid request body: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            AnalysisError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => AnalysisError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(_) => {
            AnalysisError::Internal("Failed to read request body".to_string())
        }
        other => AnalysisError::Validation(other.body_text()),
    }
}
