use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit;
use crate::db;
use crate::inventory::{BatchLedger, MovementLog, StockMovementType};
use crate::query::{Pagination, ValidatedSalesQuery};
use crate::sales::{
    generate_invoice_number, AllocationError, AllocationPlanner, CreateSaleRequest, NewSale,
    NewSaleItem, PaymentStatus, PricingCalculator, Sale, SaleError, SaleResponse, SalesRepository,
    SALE_INVOICE_PREFIX,
};

/// Ceiling on serialization-failure retries for one checkout request
const MAX_TX_ATTEMPTS: u32 = 3;

/// Orchestrates the checkout transaction
///
/// One sale is one SERIALIZABLE transaction: plan allocations against a
/// snapshot of the ledger, apply checked decrements, write the sale, its
/// slices, movements, and the audit record, then commit. Any serialization
/// failure or lost decrement race restarts the whole attempt.
#[derive(Clone)]
pub struct SaleService {
    pool: PgPool,
    repo: SalesRepository,
}

impl SaleService {
    /// Create a new SaleService
    pub fn new(pool: PgPool) -> Self {
        let repo = SalesRepository::new(pool.clone());
        Self { pool, repo }
    }

    /// Create a sale atomically, retrying on transaction conflicts
    pub async fn create_sale(
        &self,
        user_id: i32,
        request: &CreateSaleRequest,
    ) -> Result<SaleResponse, SaleError> {
        if request.items.is_empty() {
            return Err(SaleError::ValidationError(
                "At least one item is required".to_string(),
            ));
        }
        for item in &request.items {
            if crate::validation::validate_positive_quantity(&item.quantity).is_err() {
                return Err(SaleError::ValidationError(format!(
                    "Quantity must be positive, got {}",
                    item.quantity
                )));
            }
        }
        if request.discount_amount < Decimal::ZERO {
            return Err(SaleError::ValidationError(
                "Discount must not be negative".to_string(),
            ));
        }

        let mut attempt = 1;
        loop {
            match self.try_create_sale(user_id, request).await {
                Err(SaleError::Serialization) if attempt < MAX_TX_ATTEMPTS => {
                    tracing::warn!(
                        attempt,
                        "Sale transaction conflicted with a concurrent writer, retrying"
                    );
                    attempt += 1;
                }
                Err(SaleError::Serialization) => return Err(SaleError::Conflict),
                other => return other,
            }
        }
    }

    /// One checkout attempt, from BEGIN to COMMIT
    async fn try_create_sale(
        &self,
        user_id: i32,
        request: &CreateSaleRequest,
    ) -> Result<SaleResponse, SaleError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        if let Some(customer_id) = request.customer_id {
            if !db::customer_exists(&mut *tx, customer_id).await? {
                return Err(SaleError::CustomerNotFound(customer_id));
            }
        }

        let now = Utc::now();
        let mut subtotal = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        let mut new_items: Vec<NewSaleItem> = Vec::new();

        for item in &request.items {
            let product = SalesRepository::find_product_for_sale(&mut *tx, item.product_id)
                .await?
                .ok_or(SaleError::ProductNotFound(item.product_id))?;

            if product.selling_price <= Decimal::ZERO {
                return Err(SaleError::NoSellingPrice(product.name));
            }

            let batches = BatchLedger::available_batches(&mut *tx, product.id, now).await?;
            let plan = AllocationPlanner::plan(&batches, item.quantity).map_err(|err| match err {
                AllocationError::InsufficientStock {
                    available,
                    requested,
                } => SaleError::InsufficientStock {
                    product: product.name.clone(),
                    available,
                    requested,
                },
                AllocationError::InvalidQuantity(q) => {
                    SaleError::ValidationError(format!("Quantity must be positive, got {}", q))
                }
            })?;

            let unit_tax =
                PricingCalculator::unit_tax(product.selling_price, product.tax_percentage);

            for slice in &plan.slices {
                // A false return means another transaction drained this batch
                // after we planned against it; abandon the attempt and replan.
                if !BatchLedger::decrement(&mut *tx, slice.batch_id, slice.quantity).await? {
                    return Err(SaleError::Serialization);
                }

                let line_total = PricingCalculator::line_total(slice.quantity, product.selling_price);
                let line_tax = PricingCalculator::line_tax(slice.quantity, unit_tax);
                let line_cost = PricingCalculator::line_cost(slice.quantity, slice.purchase_price);

                subtotal += line_total;
                total_tax += line_tax;
                total_cost += line_cost;

                new_items.push(NewSaleItem {
                    product_id: product.id,
                    batch_id: slice.batch_id,
                    quantity: slice.quantity,
                    unit_price: product.selling_price,
                    tax_amount: line_tax,
                    total_amount: line_total,
                    cost_price: line_cost,
                });
            }

            // One movement per requested line, not per slice
            MovementLog::append(
                &mut *tx,
                product.id,
                StockMovementType::Sale,
                -item.quantity,
                Some("Sale transaction"),
                user_id,
            )
            .await?;
        }

        let total_amount =
            PricingCalculator::total_amount(subtotal, total_tax, request.discount_amount);

        let new_sale = NewSale {
            invoice_number: generate_invoice_number(SALE_INVOICE_PREFIX),
            customer_id: request.customer_id,
            subtotal,
            tax_amount: total_tax,
            discount_amount: request.discount_amount,
            total_amount,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Completed,
            notes: request.notes.clone(),
            created_by: user_id,
        };

        let sale = SalesRepository::insert_sale(&mut *tx, &new_sale).await?;

        let mut items = Vec::with_capacity(new_items.len());
        for (ordinal, new_item) in new_items.iter().enumerate() {
            items.push(
                SalesRepository::insert_sale_item(&mut *tx, sale.id, ordinal as i32, new_item)
                    .await?,
            );
        }

        if let Some(customer_id) = sale.customer_id {
            SalesRepository::increment_customer_total(&mut *tx, customer_id, sale.total_amount)
                .await?;
        }

        audit::record(
            &mut *tx,
            user_id,
            "CREATE_SALE",
            "Sale",
            &sale.id.to_string(),
            json!({
                "invoice_number": sale.invoice_number,
                "total_amount": sale.total_amount,
                "item_count": request.items.len(),
            }),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            invoice_number = %sale.invoice_number,
            total_amount = %sale.total_amount,
            "Sale committed"
        );

        Ok(SaleResponse::from_sale(sale, items))
    }

    /// Fetch a sale with its line items
    pub async fn get_sale(&self, sale_id: Uuid) -> Result<SaleResponse, SaleError> {
        let sale = self
            .repo
            .find_by_id(sale_id)
            .await?
            .ok_or(SaleError::SaleNotFound(sale_id))?;
        let items = self.repo.items_for_sale(sale_id).await?;

        Ok(SaleResponse::from_sale(sale, items))
    }

    /// Paginated sale listing
    pub async fn list_sales(
        &self,
        query: &ValidatedSalesQuery,
    ) -> Result<(Vec<Sale>, Pagination), SaleError> {
        Ok(self.repo.list(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::{PaymentMethod, SaleItemRequest};
    use rust_decimal_macros::dec;

    // A lazy pool never opens a connection, so only requests rejected before
    // any query runs can be exercised here.
    fn lazy_service() -> SaleService {
        let pool = PgPool::connect_lazy("postgres://localhost/unreachable").unwrap();
        SaleService::new(pool)
    }

    fn request_with(items: Vec<SaleItemRequest>, discount: Decimal) -> CreateSaleRequest {
        CreateSaleRequest {
            customer_id: None,
            items,
            payment_method: PaymentMethod::Cash,
            discount_amount: discount,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_empty_items_rejected_before_any_query() {
        let service = lazy_service();
        let result = service.create_sale(1, &request_with(vec![], Decimal::ZERO)).await;

        match result {
            Err(SaleError::ValidationError(msg)) => {
                assert!(msg.contains("At least one item"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_any_query() {
        let service = lazy_service();
        let items = vec![SaleItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }];
        let result = service.create_sale(1, &request_with(items, Decimal::ZERO)).await;

        match result {
            Err(SaleError::ValidationError(msg)) => {
                assert!(msg.contains("Quantity must be positive"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected_before_any_query() {
        let service = lazy_service();
        let items = vec![SaleItemRequest {
            product_id: Uuid::new_v4(),
            quantity: -5,
        }];
        let result = service.create_sale(1, &request_with(items, Decimal::ZERO)).await;

        assert!(matches!(result, Err(SaleError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_negative_discount_rejected_before_any_query() {
        let service = lazy_service();
        let items = vec![SaleItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        }];
        let result = service.create_sale(1, &request_with(items, dec!(-1))).await;

        assert!(matches!(result, Err(SaleError::ValidationError(_))));
    }
}
