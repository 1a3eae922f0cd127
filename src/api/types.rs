//! Response and error types for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use crate::catalog::ModelsConfig;
use serde::{Deserialize, Serialize};

/// Error envelope: `{"error": {"message", "type", "code"}}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(message, "invalid_request_error", "invalid_request_error")
    }

    /// Create a conflict error (409) with a specific code.
    pub fn conflict(code: &str, message: &str) -> Self {
        Self::new(message, "conflict_error", code)
    }

    /// Create an internal server error (500).
    pub fn internal(message: &str) -> Self {
        Self::new(message, "server_error", "internal_error")
    }

    fn new(message: &str, error_type: &str, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: error_type.to_string(),
                code: Some(code.to_string()),
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match (self.error.r#type.as_str(), self.error.code.as_deref()) {
            (_, Some("invalid_request_error")) => StatusCode::BAD_REQUEST,
            ("conflict_error", _) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Body of `202 Accepted` from `POST /api/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAccepted {
    pub status: String,
    pub generation: u64,
    pub models: usize,
}

/// Body of `GET /api/config`. `models` keeps document order.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub source: String,
    pub generation: u64,
    pub models: ModelsConfig,
}

/// Body of a successful `PUT /api/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigReplaced {
    pub providers: usize,
    pub models: usize,
    pub generation: u64,
    /// False when persistence is disabled or the store failed
    pub persisted: bool,
}
