//! Response types for the Entitlement Engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API, plus the bodies of the ad hoc query endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Allowance, AllowanceBreakdown, AuditWarning};

/// Response body of the `/allowance` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    /// The person queried.
    pub person_id: String,
    /// The category queried.
    pub category_id: String,
    /// The year queried.
    pub year: i32,
    /// The resolved allowance.
    pub allowance: Allowance,
    /// How the allowance was assembled.
    pub breakdown: AllowanceBreakdown,
    /// Degraded states met while resolving.
    pub warnings: Vec<AuditWarning>,
}

/// Response body of the `/usage` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    /// The person queried.
    pub person_id: String,
    /// The category queried.
    pub category_id: String,
    /// The year queried.
    pub year: i32,
    /// Days used.
    pub used: Decimal,
    /// Degraded states met while accumulating.
    pub warnings: Vec<AuditWarning>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a category not found error response.
    pub fn category_not_found(id: &str) -> Self {
        Self::with_details(
            "CATEGORY_NOT_FOUND",
            format!("Category not found: {}", id),
            format!("The category '{}' is not defined in this workspace", id),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidConfig { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Invalid configuration", message),
            },
            EngineError::CategoryNotFound { id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::category_not_found(&id),
            },
            EngineError::InvalidRequest { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_REQUEST",
                    format!("Invalid request field '{}': {}", field, message),
                    "The request data contains inconsistent information",
                ),
            },
        }
    }
}
