//! JSON error responses for the web API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::filter::FilterError;
use crate::source::SourceError;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidCategory,
    UpstreamUnavailable,
    UpstreamUnreadable,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidCategory => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable | Self::UpstreamUnreadable => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.code.status(), body).into_response()
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        warn!(error = %err, "Rejected calendar request");
        Self::new(ApiErrorCode::InvalidCategory, err.to_string())
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        error!(error = ?err, "Failed to load races from upstream");
        match err {
            SourceError::Fetch(_) => {
                Self::new(ApiErrorCode::UpstreamUnavailable, "Failed to fetch data")
            }
            SourceError::Extract(_) => {
                Self::new(ApiErrorCode::UpstreamUnreadable, "Upstream listing could not be read")
            }
        }
    }
}
