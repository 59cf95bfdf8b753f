use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stock movement type tag for the append-only movement log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StockMovementType {
    Sale,
    Purchase,
    Adjustment,
    Damage,
    Return,
}

impl StockMovementType {
    /// Convert movement type to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StockMovementType::Sale => "SALE",
            StockMovementType::Purchase => "PURCHASE",
            StockMovementType::Adjustment => "ADJUSTMENT",
            StockMovementType::Damage => "DAMAGE",
            StockMovementType::Return => "RETURN",
        }
    }

    /// Parse movement type from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "SALE" => Ok(StockMovementType::Sale),
            "PURCHASE" => Ok(StockMovementType::Purchase),
            "ADJUSTMENT" => Ok(StockMovementType::Adjustment),
            "DAMAGE" => Ok(StockMovementType::Damage),
            "RETURN" => Ok(StockMovementType::Return),
            _ => Err(format!("Invalid stock movement type: {}", s)),
        }
    }
}

impl std::fmt::Display for StockMovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One batch of a product received together
///
/// Identity is (product_id, batch_number); quantity is the only routinely
/// mutated field and can never drop below zero. Exhausted batches stay on
/// record for history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProductBatch {
    pub id: Uuid,
    pub product_id: Uuid,
    pub batch_number: String,
    pub quantity: i32,
    /// Purchase price per unit at time of receipt
    pub purchase_price: Decimal,
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a stock change
///
/// Negative quantity for outgoing stock (sales), positive for incoming
/// (purchases, returns). Never updated or deleted, and never used to derive
/// current stock; the batch ledger is the authoritative current-state view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: StockMovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for a manual stock adjustment
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    /// Required for ADJUSTMENT, DAMAGE and RETURN
    pub batch_id: Option<Uuid>,
    pub movement_type: StockMovementType,
    /// Signed quantity delta; RETURN takes the absolute value
    pub quantity: i32,
    pub reason: Option<String>,
}

/// Request DTO for receiving purchased stock into a batch
///
/// Receipts land on (product_id, batch_number): an existing batch has its
/// quantity incremented and its purchase price and expiration refreshed, a
/// new batch number creates the batch.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiveStockRequest {
    pub product_id: Uuid,
    pub batch_number: String,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Per-product stock summary computed from live batches
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct InventoryStatus {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub min_stock_level: i32,
    pub total_stock: i64,
    /// Stock value at purchase price
    pub total_value: Decimal,
    pub nearest_expiry: Option<DateTime<Utc>>,
    pub is_low_stock: bool,
}

/// Query parameters for the inventory status view
#[derive(Debug, Deserialize)]
pub struct InventoryQueryParams {
    /// Partial product name match (case-insensitive)
    pub search: Option<String>,
    /// Only products at or below their minimum stock level
    pub low_stock: Option<bool>,
    /// Only products with stock expiring within 30 days
    pub expiring: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_round_trip() {
        for movement_type in [
            StockMovementType::Sale,
            StockMovementType::Purchase,
            StockMovementType::Adjustment,
            StockMovementType::Damage,
            StockMovementType::Return,
        ] {
            assert_eq!(
                StockMovementType::from_str(movement_type.as_str()).unwrap(),
                movement_type
            );
        }
        assert!(StockMovementType::from_str("TRANSFER").is_err());
    }

    #[test]
    fn test_movement_type_serde_uses_uppercase() {
        let json = serde_json::to_string(&StockMovementType::Sale).unwrap();
        assert_eq!(json, "\"SALE\"");

        let parsed: StockMovementType = serde_json::from_str("\"RETURN\"").unwrap();
        assert_eq!(parsed, StockMovementType::Return);
    }

    #[test]
    fn test_adjust_request_deserialization() {
        let product_id = Uuid::new_v4();
        let batch_id = Uuid::new_v4();
        let json = format!(
            r#"{{
                "product_id": "{}",
                "batch_id": "{}",
                "movement_type": "DAMAGE",
                "quantity": -3,
                "reason": "Dropped crate"
            }}"#,
            product_id, batch_id
        );

        let request: AdjustStockRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.product_id, product_id);
        assert_eq!(request.batch_id, Some(batch_id));
        assert_eq!(request.movement_type, StockMovementType::Damage);
        assert_eq!(request.quantity, -3);
        assert_eq!(request.reason.as_deref(), Some("Dropped crate"));
    }
}
