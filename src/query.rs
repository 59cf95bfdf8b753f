use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Pagination metadata returned next to every paginated listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Compute pagination metadata from the page window and total row count
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// SQL query builder for the sale listing endpoint
/// Builds a single parameterized query with filters and pagination
///
/// Parameters are carried as text and cast in the SQL, so the same `Vec<String>`
/// bind path serves timestamps and UUIDs alike.
pub struct SQLQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    limit: u32,
    offset: u32,
}

impl SQLQueryBuilder {
    /// Creates a new builder over the sales table
    pub fn new() -> Self {
        Self {
            base_query: "SELECT id, invoice_number, customer_id, subtotal, tax_amount, \
                         discount_amount, total_amount, payment_method, payment_status, \
                         notes, created_by, created_at FROM sales"
                .to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            limit: 50,
            offset: 0,
        }
    }

    /// Adds an inclusive created_at range filter
    pub fn add_date_range(&mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) {
        if let Some(start_date) = start {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("created_at >= ${}::timestamptz", param_index));
            self.params.push(start_date.to_rfc3339());
        }

        if let Some(end_date) = end {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("created_at <= ${}::timestamptz", param_index));
            self.params.push(end_date.to_rfc3339());
        }
    }

    /// Adds an exact customer filter
    pub fn add_customer_filter(&mut self, customer_id: Uuid) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("customer_id = ${}::uuid", param_index));
        self.params.push(customer_id.to_string());
    }

    /// Sets pagination parameters
    /// Calculates LIMIT and OFFSET based on page number and limit
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1) * limit;
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        // Newest sales first
        query.push_str(" ORDER BY created_at DESC");

        // LIMIT and OFFSET are validated integers, appended directly
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }

    /// Builds the matching COUNT query for pagination metadata
    pub fn build_count(&self) -> (String, Vec<String>) {
        let mut query = "SELECT COUNT(*) FROM sales".to_string();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        (query, self.params.clone())
    }
}

impl Default for SQLQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters extracted from the HTTP request
/// All fields are optional to support flexible querying
#[derive(Debug, Deserialize)]
pub struct SalesQueryParams {
    /// Inclusive lower bound on created_at (RFC 3339)
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on created_at (RFC 3339)
    pub end_date: Option<DateTime<Utc>>,
    /// Filter by customer
    pub customer_id: Option<Uuid>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

/// Validated query parameters with defaults applied
#[derive(Debug)]
pub struct ValidatedSalesQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub customer_id: Option<Uuid>,
    pub page: u32,
    pub limit: u32,
}

/// Validator for sale listing query parameters
pub struct QueryValidator;

impl QueryValidator {
    const MAX_LIMIT: u32 = 100;
    const DEFAULT_LIMIT: u32 = 50;
    // Keeps (page - 1) * limit comfortably inside u32
    const MAX_PAGE: u32 = 1_000_000;

    /// Validate raw query parameters, applying defaults and bounds
    pub fn validate(params: SalesQueryParams) -> Result<ValidatedSalesQuery, String> {
        let page = params.page.unwrap_or(1);
        if page == 0 || page > Self::MAX_PAGE {
            return Err(format!("page must be between 1 and {}", Self::MAX_PAGE));
        }

        let limit = params.limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(format!("limit must be between 1 and {}", Self::MAX_LIMIT));
        }

        if let (Some(start), Some(end)) = (params.start_date, params.end_date) {
            if start > end {
                return Err("start_date must not be after end_date".to_string());
            }
        }

        Ok(ValidatedSalesQuery {
            start_date: params.start_date,
            end_date: params.end_date,
            customer_id: params.customer_id,
            page,
            limit,
        })
    }
}
