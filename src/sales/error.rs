use axum::{
    http,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the checkout pipeline
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("Product '{0}' has no selling price set")]
    NoSellingPrice(String),

    #[error("Insufficient stock for {product}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i32,
    },

    #[error("Sale not found: {0}")]
    SaleNotFound(Uuid),

    /// Internal marker for a serialization failure or a lost decrement race.
    /// The service retries on this; it only escapes as a response after the
    /// retry budget is spent.
    #[error("Transaction conflict")]
    Serialization,

    #[error("Sale could not be completed due to concurrent stock changes, please retry")]
    Conflict,

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for SaleError {
    fn from(err: sqlx::Error) -> Self {
        // 40001: serialization_failure, 40P01: deadlock_detected
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                if code == "40001" || code == "40P01" {
                    return SaleError::Serialization;
                }
            }
        }
        SaleError::DatabaseError(err)
    }
}

impl SaleError {
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            SaleError::ValidationError(_)
            | SaleError::NoSellingPrice(_)
            | SaleError::InsufficientStock { .. } => http::StatusCode::BAD_REQUEST,
            SaleError::ProductNotFound(_)
            | SaleError::CustomerNotFound(_)
            | SaleError::SaleNotFound(_) => http::StatusCode::NOT_FOUND,
            SaleError::Serialization | SaleError::Conflict => http::StatusCode::CONFLICT,
            SaleError::DatabaseError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SaleError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            SaleError::DatabaseError(err) => {
                tracing::error!("Sale database error: {:?}", err);
            }
            SaleError::Serialization | SaleError::Conflict => {
                tracing::warn!("Sale transaction conflict surfaced to client");
            }
            other => {
                tracing::debug!("Sale request rejected: {}", other);
            }
        }

        let message = match &self {
            SaleError::DatabaseError(_) => "An internal error occurred".to_string(),
            SaleError::Serialization => SaleError::Conflict.to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SaleError::ValidationError("bad".into()).status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SaleError::NoSellingPrice("Milk".into()).status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SaleError::InsufficientStock {
                product: "Milk".into(),
                available: 3,
                requested: 5,
            }
            .status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SaleError::ProductNotFound(Uuid::new_v4()).status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            SaleError::Conflict.status_code(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            SaleError::Serialization.status_code(),
            http::StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = SaleError::InsufficientStock {
            product: "Whole Milk 1L".into(),
            available: 12,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Whole Milk 1L. Available: 12, Requested: 20"
        );
    }
}
