// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Specific reason an attempt start was rejected by the lifecycle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityReason {
    NoProof,
    Locked,
    MaxAttempts,
    AlreadyCertified,
}

impl EligibilityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityReason::NoProof => "no-proof",
            EligibilityReason::Locked => "locked",
            EligibilityReason::MaxAttempts => "max-attempts",
            EligibilityReason::AlreadyCertified => "already-certified",
        }
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., re-grading a completed attempt)
    Conflict(String),

    // 403 Forbidden: policy rejection with the specific reason
    AttemptNotEligible(EligibilityReason),

    // 422 Unprocessable: the attempt record handed to grading is malformed
    // (response/item count mismatch or an out-of-range choice index)
    AttemptShapeInvalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::AttemptNotEligible(reason) => {
                tracing::info!("Attempt rejected: {}", reason.as_str());
                (
                    StatusCode::FORBIDDEN,
                    json!({ "error": "Attempt not eligible", "reason": reason.as_str() }),
                )
            }
            AppError::AttemptShapeInvalid(msg) => {
                tracing::error!("Malformed attempt record: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": format!("Attempt shape invalid: {}", msg) }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
