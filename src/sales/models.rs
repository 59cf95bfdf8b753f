use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::Pagination;

/// Payment method accepted at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Credit,
    Mixed,
}

impl PaymentMethod {
    /// Convert payment method to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Credit => "CREDIT",
            PaymentMethod::Mixed => "MIXED",
        }
    }

    /// Parse payment method from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "UPI" => Ok(PaymentMethod::Upi),
            "CREDIT" => Ok(PaymentMethod::Credit),
            "MIXED" => Ok(PaymentMethod::Mixed),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of a sale
///
/// This core only ever writes Completed; the other states serve the purchase
/// and administrative flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
    Partial,
}

impl PaymentStatus {
    /// Convert payment status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Partial => "PARTIAL",
        }
    }

    /// Parse payment status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            "PARTIAL" => Ok(PaymentStatus::Partial),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a committed sale
///
/// Immutable once created; `total_amount = subtotal + tax_amount -
/// discount_amount`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sale {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

/// One (sale, batch) allocation slice
///
/// A requested product spanning multiple batches produces one row per batch,
/// each carrying the cost price of its own batch. `ordinal` preserves
/// allocation order across reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub batch_id: Uuid,
    pub ordinal: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub cost_price: Decimal,
}

/// Request DTO for one requested line of a sale
///
/// Quantity positivity is enforced in the service, before any allocation
/// work, since per-element validation does not nest through the request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Request DTO for creating a sale
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSaleRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<SaleItemRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    pub discount_amount: Decimal,
    pub notes: Option<String>,
}

/// Line item fields computed during checkout, before the sale id exists
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub batch_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub cost_price: Decimal,
}

/// Sale header fields for insertion
#[derive(Debug)]
pub struct NewSale {
    pub invoice_number: String,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: i32,
}

/// Response DTO for a sale with derived cost figures
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItemResponse>,
    pub cost_of_goods_sold: Decimal,
    pub gross_profit: Decimal,
}

/// Response DTO for one sale line item
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub batch_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub cost_price: Decimal,
}

impl From<SaleItem> for SaleItemResponse {
    fn from(item: SaleItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            batch_id: item.batch_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            tax_amount: item.tax_amount,
            total_amount: item.total_amount,
            cost_price: item.cost_price,
        }
    }
}

impl SaleResponse {
    /// Assemble the response from a persisted sale and its line items
    ///
    /// Cost of goods sold is the sum of the slices' cost prices; gross profit
    /// is total minus that cost.
    pub fn from_sale(sale: Sale, items: Vec<SaleItem>) -> Self {
        let cost_of_goods_sold: Decimal = items.iter().map(|item| item.cost_price).sum();
        let gross_profit = sale.total_amount - cost_of_goods_sold;

        Self {
            id: sale.id,
            invoice_number: sale.invoice_number,
            customer_id: sale.customer_id,
            subtotal: sale.subtotal,
            tax_amount: sale.tax_amount,
            discount_amount: sale.discount_amount,
            total_amount: sale.total_amount,
            payment_method: sale.payment_method,
            payment_status: sale.payment_status,
            notes: sale.notes,
            created_by: sale.created_by,
            created_at: sale.created_at,
            items: items.into_iter().map(SaleItemResponse::from).collect(),
            cost_of_goods_sold,
            gross_profit,
        }
    }
}

/// Response DTO for the paginated sale listing
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleListResponse {
    pub data: Vec<Sale>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Upi,
            PaymentMethod::Credit,
            PaymentMethod::Mixed,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()).unwrap(), method);
        }
        assert!(PaymentMethod::from_str("CHEQUE").is_err());
    }

    #[test]
    fn test_payment_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Cancelled,
            PaymentStatus::Partial,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(PaymentStatus::from_str("REFUNDED").is_err());
    }

    #[test]
    fn test_create_sale_request_deserialization() {
        let product_id = Uuid::new_v4();
        let json = format!(
            r#"{{
                "items": [{{ "product_id": "{}", "quantity": 2 }}],
                "payment_method": "CASH"
            }}"#,
            product_id
        );

        let request: CreateSaleRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.customer_id, None);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.payment_method, PaymentMethod::Cash);
        // Discount defaults to zero when omitted
        assert_eq!(request.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn test_create_sale_request_validation() {
        let empty = CreateSaleRequest {
            customer_id: None,
            items: vec![],
            payment_method: PaymentMethod::Cash,
            discount_amount: Decimal::ZERO,
            notes: None,
        };
        assert!(empty.validate().is_err());

        let negative_discount = CreateSaleRequest {
            customer_id: None,
            items: vec![SaleItemRequest {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Card,
            discount_amount: dec!(-5),
            notes: None,
        };
        assert!(negative_discount.validate().is_err());

        let valid = CreateSaleRequest {
            customer_id: None,
            items: vec![SaleItemRequest {
                product_id: Uuid::new_v4(),
                quantity: 3,
            }],
            payment_method: PaymentMethod::Upi,
            discount_amount: dec!(2.50),
            notes: Some("counter 2".to_string()),
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_sale_response_derives_cogs_and_profit() {
        let sale_id = Uuid::new_v4();
        let sale = Sale {
            id: sale_id,
            invoice_number: "INV240115ABC123".to_string(),
            customer_id: None,
            subtotal: dec!(80.00),
            tax_amount: dec!(8.00),
            discount_amount: Decimal::ZERO,
            total_amount: dec!(88.00),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Completed,
            notes: None,
            created_by: 1,
            created_at: Utc::now(),
        };

        let item = |ordinal: i32, quantity: i32, cost_price: Decimal| SaleItem {
            id: Uuid::new_v4(),
            sale_id,
            product_id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            ordinal,
            quantity,
            unit_price: dec!(10.00),
            tax_amount: Decimal::from(quantity) * dec!(1.00),
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::from(quantity) * dec!(10.00),
            cost_price,
        };

        let response = SaleResponse::from_sale(sale, vec![item(0, 5, dec!(30.00)), item(1, 3, dec!(19.50))]);

        assert_eq!(response.cost_of_goods_sold, dec!(49.50));
        assert_eq!(response.gross_profit, dec!(38.50));
        assert_eq!(response.items.len(), 2);
    }
}
