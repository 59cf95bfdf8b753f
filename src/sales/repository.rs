use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Product;
use crate::query::{Pagination, SQLQueryBuilder, ValidatedSalesQuery};
use crate::sales::{NewSale, NewSaleItem, Sale, SaleItem};

/// Repository for sale persistence and lookups
#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    /// Create a new SalesRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one sale by id
    pub async fn find_by_id(&self, sale_id: Uuid) -> Result<Option<Sale>, sqlx::Error> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, subtotal, tax_amount,
                   discount_amount, total_amount, payment_method, payment_status,
                   notes, created_by, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Fetch the line items of a sale, in allocation order
    pub async fn items_for_sale(&self, sale_id: Uuid) -> Result<Vec<SaleItem>, sqlx::Error> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, batch_id, ordinal, quantity, unit_price,
                   tax_amount, discount_amount, total_amount, cost_price
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY ordinal
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Paginated sale listing with the validated filters applied
    pub async fn list(
        &self,
        query: &ValidatedSalesQuery,
    ) -> Result<(Vec<Sale>, Pagination), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new();
        builder.add_date_range(query.start_date, query.end_date);
        if let Some(customer_id) = query.customer_id {
            builder.add_customer_filter(customer_id);
        }
        builder.set_pagination(query.page, query.limit);

        let (sql, params) = builder.build();
        let mut statement = sqlx::query_as::<_, Sale>(&sql);
        for param in &params {
            statement = statement.bind(param);
        }
        let sales = statement.fetch_all(&self.pool).await?;

        let (count_sql, count_params) = builder.build_count();
        let mut count_statement = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &count_params {
            count_statement = count_statement.bind(param);
        }
        let total = count_statement.fetch_one(&self.pool).await?;

        Ok((sales, Pagination::new(query.page, query.limit, total)))
    }

    /// Fetch a product's selling fields inside the checkout transaction
    ///
    /// Deactivated products stay sellable; deactivation only hides them from
    /// catalogue listings.
    pub async fn find_product_for_sale(
        conn: &mut PgConnection,
        product_id: Uuid,
    ) -> Result<Option<Product>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, unit, selling_price, tax_percentage,
                   min_stock_level, max_stock_level, is_active, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Insert the sale header, returning the stored row
    pub async fn insert_sale(conn: &mut PgConnection, sale: &NewSale) -> Result<Sale, sqlx::Error> {
        let stored = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (invoice_number, customer_id, subtotal, tax_amount,
                               discount_amount, total_amount, payment_method,
                               payment_status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, invoice_number, customer_id, subtotal, tax_amount,
                      discount_amount, total_amount, payment_method, payment_status,
                      notes, created_by, created_at
            "#,
        )
        .bind(&sale.invoice_number)
        .bind(sale.customer_id)
        .bind(sale.subtotal)
        .bind(sale.tax_amount)
        .bind(sale.discount_amount)
        .bind(sale.total_amount)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.notes)
        .bind(sale.created_by)
        .fetch_one(conn)
        .await?;

        Ok(stored)
    }

    /// Insert one allocation slice as a sale line item
    pub async fn insert_sale_item(
        conn: &mut PgConnection,
        sale_id: Uuid,
        ordinal: i32,
        item: &NewSaleItem,
    ) -> Result<SaleItem, sqlx::Error> {
        let stored = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, batch_id, ordinal, quantity,
                                    unit_price, tax_amount, discount_amount,
                                    total_amount, cost_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9)
            RETURNING id, sale_id, product_id, batch_id, ordinal, quantity, unit_price,
                      tax_amount, discount_amount, total_amount, cost_price
            "#,
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.batch_id)
        .bind(ordinal)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.tax_amount)
        .bind(item.total_amount)
        .bind(item.cost_price)
        .fetch_one(conn)
        .await?;

        Ok(stored)
    }

    /// Add the sale total to the customer's lifetime purchase figure
    pub async fn increment_customer_total(
        conn: &mut PgConnection,
        customer_id: Uuid,
        amount: rust_decimal::Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE customers SET total_purchased = total_purchased + $1 WHERE id = $2")
            .bind(amount)
            .bind(customer_id)
            .execute(conn)
            .await?;

        Ok(())
    }
}
