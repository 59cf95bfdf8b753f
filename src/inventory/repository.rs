use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::inventory::{InventoryStatus, ProductBatch, StockMovement, StockMovementType};

/// Authoritative current-quantity view per product, partitioned by batch
///
/// Every operation takes an open connection so callers can compose ledger
/// mutations into one transaction; the ledger never commits on its own.
pub struct BatchLedger;

impl BatchLedger {
    /// Batches eligible to sell from, in allocation order
    ///
    /// Eligible means quantity > 0, not flagged expired, and either no
    /// expiration date or one strictly after `as_of`. Ordering is the
    /// FIFO-by-expiry policy: soonest expiry first, no-expiry batches last,
    /// ties broken by receipt order.
    pub async fn available_batches(
        conn: &mut PgConnection,
        product_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ProductBatch>, sqlx::Error> {
        let batches = sqlx::query_as::<_, ProductBatch>(
            r#"
            SELECT id, product_id, batch_number, quantity, purchase_price,
                   expiration_date, is_expired, created_at
            FROM product_batches
            WHERE product_id = $1
              AND quantity > 0
              AND is_expired = FALSE
              AND (expiration_date IS NULL OR expiration_date > $2)
            ORDER BY expiration_date ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(product_id)
        .bind(as_of)
        .fetch_all(conn)
        .await?;

        Ok(batches)
    }

    /// Conditionally reduce a batch's quantity
    ///
    /// Returns false when the guard `quantity >= $n` no longer holds, i.e. a
    /// concurrent consumer drained the batch between planning and this write.
    /// The batch row is left untouched in that case.
    pub async fn decrement(
        conn: &mut PgConnection,
        batch_id: Uuid,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE product_batches
            SET quantity = quantity - $1
            WHERE id = $2 AND quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(batch_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Increase a batch's quantity (return path)
    pub async fn increment(
        conn: &mut PgConnection,
        batch_id: Uuid,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE product_batches SET quantity = quantity + $1 WHERE id = $2")
            .bind(quantity)
            .bind(batch_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Apply a signed delta, refusing to drive the quantity below zero
    ///
    /// Returns false when the delta would make the quantity negative.
    pub async fn adjust(
        conn: &mut PgConnection,
        batch_id: Uuid,
        delta: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE product_batches
            SET quantity = quantity + $1
            WHERE id = $2 AND quantity + $1 >= 0
            "#,
        )
        .bind(delta)
        .bind(batch_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record a purchase receipt against (product_id, batch_number)
    ///
    /// An existing batch gains the received quantity and takes the latest
    /// purchase price and expiration date; an unknown batch number creates
    /// the batch. Returns the batch row after the receipt.
    pub async fn upsert_receipt(
        conn: &mut PgConnection,
        product_id: Uuid,
        batch_number: &str,
        quantity: i32,
        purchase_price: Decimal,
        expiration_date: Option<DateTime<Utc>>,
    ) -> Result<ProductBatch, sqlx::Error> {
        let batch = sqlx::query_as::<_, ProductBatch>(
            r#"
            INSERT INTO product_batches (product_id, batch_number, quantity,
                                         purchase_price, expiration_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id, batch_number) DO UPDATE
            SET quantity = product_batches.quantity + EXCLUDED.quantity,
                purchase_price = EXCLUDED.purchase_price,
                expiration_date = EXCLUDED.expiration_date
            RETURNING id, product_id, batch_number, quantity, purchase_price,
                      expiration_date, is_expired, created_at
            "#,
        )
        .bind(product_id)
        .bind(batch_number)
        .bind(quantity)
        .bind(purchase_price)
        .bind(expiration_date)
        .fetch_one(conn)
        .await?;

        Ok(batch)
    }

    /// Fetch one batch, scoped to its product
    pub async fn find_batch(
        conn: &mut PgConnection,
        batch_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<ProductBatch>, sqlx::Error> {
        let batch = sqlx::query_as::<_, ProductBatch>(
            r#"
            SELECT id, product_id, batch_number, quantity, purchase_price,
                   expiration_date, is_expired, created_at
            FROM product_batches
            WHERE id = $1 AND product_id = $2
            "#,
        )
        .bind(batch_id)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

        Ok(batch)
    }
}

/// Append-only movement log
///
/// Insert is the only operation; movements are never updated or deleted.
pub struct MovementLog;

impl MovementLog {
    /// Append one movement record
    pub async fn append(
        conn: &mut PgConnection,
        product_id: Uuid,
        movement_type: StockMovementType,
        quantity: i32,
        reason: Option<&str>,
        created_by: i32,
    ) -> Result<StockMovement, sqlx::Error> {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, reason, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, movement_type, quantity, reason, created_by, created_at
            "#,
        )
        .bind(product_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reason)
        .bind(created_by)
        .fetch_one(conn)
        .await?;

        Ok(movement)
    }
}

/// Repository for pool-level inventory reads
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    /// Create a new InventoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a product row exists
    pub async fn product_exists(&self, product_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.unwrap_or(false))
    }

    /// Per-product stock summary over live batches, with optional filters
    ///
    /// Current stock is always derived here, from the batch ledger; the
    /// movement log is never summed for this view.
    pub async fn stock_status(
        &self,
        search: Option<&str>,
        low_stock_only: bool,
        expiring_only: bool,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<InventoryStatus>, sqlx::Error> {
        let (filter_sql, having_sql) = Self::status_filters(search.is_some(), low_stock_only, expiring_only);

        let query = format!(
            r#"
            SELECT p.id, p.name, p.unit, p.min_stock_level,
                   COALESCE(SUM(b.quantity), 0)::BIGINT AS total_stock,
                   COALESCE(SUM(b.quantity * b.purchase_price), 0) AS total_value,
                   MIN(b.expiration_date) AS nearest_expiry,
                   COALESCE(SUM(b.quantity), 0) <= p.min_stock_level AS is_low_stock
            FROM products p
            LEFT JOIN product_batches b ON b.product_id = p.id AND b.quantity > 0
            WHERE p.is_active = TRUE{filter_sql}
            GROUP BY p.id{having_sql}
            ORDER BY p.name ASC
            LIMIT {limit} OFFSET {offset}
            "#
        );

        let mut statement = sqlx::query_as::<_, InventoryStatus>(&query);
        if let Some(term) = search {
            statement = statement.bind(format!("%{}%", term));
        }

        statement.fetch_all(&self.pool).await
    }

    /// Total row count for the same filtered view, for pagination metadata
    pub async fn stock_status_count(
        &self,
        search: Option<&str>,
        low_stock_only: bool,
        expiring_only: bool,
    ) -> Result<i64, sqlx::Error> {
        let (filter_sql, having_sql) = Self::status_filters(search.is_some(), low_stock_only, expiring_only);

        let query = format!(
            r#"
            SELECT COUNT(*) FROM (
                SELECT p.id
                FROM products p
                LEFT JOIN product_batches b ON b.product_id = p.id AND b.quantity > 0
                WHERE p.is_active = TRUE{filter_sql}
                GROUP BY p.id{having_sql}
            ) matching
            "#
        );

        let mut statement = sqlx::query_scalar::<_, i64>(&query);
        if let Some(term) = search {
            statement = statement.bind(format!("%{}%", term));
        }

        statement.fetch_one(&self.pool).await
    }

    fn status_filters(
        with_search: bool,
        low_stock_only: bool,
        expiring_only: bool,
    ) -> (String, String) {
        let filter_sql = if with_search {
            " AND p.name ILIKE $1".to_string()
        } else {
            String::new()
        };

        let mut having = Vec::new();
        if low_stock_only {
            having.push("COALESCE(SUM(b.quantity), 0) <= p.min_stock_level");
        }
        if expiring_only {
            having.push("MIN(b.expiration_date) <= NOW() + INTERVAL '30 days'");
        }

        let having_sql = if having.is_empty() {
            String::new()
        } else {
            format!(" HAVING {}", having.join(" AND "))
        };

        (filter_sql, having_sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filters_empty() {
        let (filter, having) = InventoryRepository::status_filters(false, false, false);
        assert!(filter.is_empty());
        assert!(having.is_empty());
    }

    #[test]
    fn test_status_filters_combined() {
        let (filter, having) = InventoryRepository::status_filters(true, true, true);
        assert_eq!(filter, " AND p.name ILIKE $1");
        assert!(having.contains("min_stock_level"));
        assert!(having.contains("INTERVAL '30 days'"));
        assert!(having.contains(" AND "));
    }
}
