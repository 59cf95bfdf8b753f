// Centralized error types and HTTP response conversion
//
// Module-level errors (SaleError, InventoryError, AuthError) cover their own
// routes; ApiError is the envelope for everything surfaced outside a module.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error};

/// Top-level API error
///
/// Client-causable conditions map to 4xx responses; anything unexpected is
/// logged server-side and reported as a generic 500 without internals.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    #[error("A database error occurred")]
    DatabaseError(#[from] sqlx::Error),
}

/// Consistent error response structure
///
/// Every error surfaces as this JSON body: a machine-readable code, a
/// human-readable message, and an ISO 8601 timestamp.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &str, message: String) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", self.to_string()),
                )
            }
            ApiError::DatabaseError(db_error) => {
                // Full detail stays server-side
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("DATABASE_ERROR", "A database error occurred".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// HTTP status code for this error without building the full response
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
