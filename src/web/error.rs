//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::FieldErrors;
use crate::error::{Error, ErrorKind};

/// Body of every credential failure, whichever factor failed.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Body of every internal failure.
pub const INTERNAL_ERROR: &str = "An internal error occurred";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Validation error (422) - field-level failures.
    ValidationError,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field → message map, present only for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<BTreeMap<String, String>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error carrying every field failure.
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(fields.into_map()),
        }
    }

    /// Map a failure of `operation` to its response.
    ///
    /// Client errors carry their own message. Everything else is logged
    /// with the operation name and answered with a generic 500.
    pub fn from_error(operation: &'static str, err: impl Into<Error>) -> Self {
        let err = err.into();
        if let Error::Validation(fields) = err {
            return ApiError::validation(fields);
        }

        match err.kind() {
            ErrorKind::Authentication => ApiError::unauthorized(INVALID_CREDENTIALS),
            ErrorKind::Format => ApiError::bad_request("Malformed session identifier"),
            kind => {
                tracing::error!(operation, error = %err, kind = ?kind, "Request failed");
                ApiError::internal(INTERNAL_ERROR)
            }
        }
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
