//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::core::EnrollmentError;

/// Body returned for every server-side failure
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Caller input was malformed or invalid; the message is returned as-is
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    /// Server-side failure; the detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY", msg)
            }
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        if err.is_client_error() {
            ApiError::Unprocessable(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}
