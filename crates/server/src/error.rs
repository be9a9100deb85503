//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the error body is always
//! `{"error": "..."}` so clients have one shape to parse.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postprep_core::PostprepError;
use serde_json::json;

/// An error ready to be serialized as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_configured(what: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{what} is not configured"),
        }
    }
}

impl From<PostprepError> for ApiError {
    fn from(err: PostprepError) -> Self {
        let status = match &err {
            PostprepError::InvalidUrl(_) | PostprepError::MissingField(_) => StatusCode::BAD_REQUEST,
            PostprepError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            PostprepError::FetchStatus { .. }
            | PostprepError::HttpError(_)
            | PostprepError::Timeout { .. }
            | PostprepError::CaptionApi(_)
            | PostprepError::CaptionRejected(_)
            | PostprepError::TokenExchange(_)
            | PostprepError::MediaCreate(_)
            | PostprepError::MediaPublish(_) => StatusCode::BAD_GATEWAY,
            PostprepError::Store(_) | PostprepError::Io(_) | PostprepError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
