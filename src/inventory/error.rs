use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Error types for inventory operations
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Batch not found or does not belong to product: {0}")]
    BatchNotFound(Uuid),

    #[error("Batch ID is required for {0} adjustments")]
    BatchRequired(String),

    #[error("Insufficient stock in batch")]
    InsufficientBatchStock,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        InventoryError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            InventoryError::DatabaseError(msg) => {
                tracing::error!("Inventory database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            InventoryError::ProductNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Product with id {} not found", id),
            ),
            InventoryError::BatchNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Batch with id {} not found for this product", id),
            ),
            InventoryError::BatchRequired(movement_type) => (
                StatusCode::BAD_REQUEST,
                format!("Batch ID is required for {} adjustments", movement_type),
            ),
            InventoryError::InsufficientBatchStock => (
                StatusCode::BAD_REQUEST,
                "Insufficient stock in batch".to_string(),
            ),
            InventoryError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
