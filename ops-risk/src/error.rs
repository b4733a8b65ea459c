//! Error types for ops-risk HTTP handlers

use crate::calibration::CalibrationError;
use crate::fusion::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected fusion input (400)
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected calibration request (400)
    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),
}

impl ApiError {
    /// Input field to point the caller at, when there is one
    fn field(&self) -> Option<String> {
        match self {
            ApiError::Validation(err) => Some(err.field().to_string()),
            ApiError::Calibration(CalibrationError::InvalidSample { source, .. }) => {
                Some(source.field().to_string())
            }
            ApiError::Calibration(CalibrationError::Validation(err)) => {
                Some(err.field().to_string())
            }
            ApiError::Calibration(CalibrationError::InvalidParams { field, .. }) => {
                Some(field.to_string())
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let field = self.field();
        let (status, error_code, message) = match self {
            ApiError::Validation(ref err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::Calibration(ref err) => {
                (StatusCode::BAD_REQUEST, "CALIBRATION_ERROR", err.to_string())
            }
        };

        let body = match field {
            Some(field) => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "field": field,
                }
            }),
            None => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
