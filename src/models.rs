use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Represents a catalog product in the database
///
/// Selling price and tax percentage are read at allocation time; they are not
/// snapshotted per batch. A product is only sellable while `selling_price > 0`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Basmati Rice 1kg")]
    pub name: String,
    /// Unit of measure ("pcs", "kg", "ltr", ...)
    #[schema(example = "pcs")]
    pub unit: String,
    #[schema(example = "10.00")]
    pub selling_price: Decimal,
    /// Tax rate as a percentage of the selling price
    #[schema(example = "10.00")]
    pub tax_percentage: Decimal,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Represents a customer with a running purchase total
///
/// `total_purchased` is an increment-only accumulator bumped by each completed
/// sale that references the customer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Walk-in Customer")]
    pub name: String,
    pub phone: Option<String>,
    pub total_purchased: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Test Product serialization to JSON
    #[test]
    fn test_product_serialization() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Basmati Rice 1kg".to_string(),
            unit: "pcs".to_string(),
            selling_price: dec!(10.00),
            tax_percentage: dec!(10.00),
            min_stock_level: 5,
            max_stock_level: 100,
            is_active: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&product).expect("Failed to serialize Product");

        assert!(json.contains("\"name\":\"Basmati Rice 1kg\""));
        assert!(json.contains("\"unit\":\"pcs\""));
        assert!(json.contains("\"selling_price\":\"10.00\""));
        assert!(json.contains("\"tax_percentage\":\"10.00\""));
        assert!(json.contains("\"is_active\":true"));
        assert!(json.contains("\"created_at\""));
    }

    /// Test Customer deserialization from JSON
    #[test]
    fn test_customer_deserialization() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{
                "id": "{}",
                "name": "Walk-in Customer",
                "phone": null,
                "total_purchased": "125.50",
                "created_at": "2024-01-15T10:30:00Z"
            }}"#,
            id
        );

        let customer: Customer =
            serde_json::from_str(&json).expect("Failed to deserialize Customer");

        assert_eq!(customer.id, id);
        assert_eq!(customer.name, "Walk-in Customer");
        assert_eq!(customer.phone, None);
        assert_eq!(customer.total_purchased, dec!(125.50));
    }
}
