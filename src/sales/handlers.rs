// HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::query::{QueryValidator, SalesQueryParams};
use crate::sales::{CreateSaleRequest, SaleError, SaleListResponse, SaleResponse};

/// Handler for POST /api/sales
/// Creates a sale atomically: allocation, checked decrements, pricing, and
/// the movement and audit records commit or roll back together
#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale committed", body = SaleResponse),
        (status = 400, description = "Invalid request or insufficient stock"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Product or customer not found"),
        (status = 409, description = "Concurrent stock contention, retry"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "sales"
)]
pub async fn create_sale_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), SaleError> {
    request
        .validate()
        .map_err(|err| SaleError::ValidationError(err.to_string()))?;

    tracing::debug!(
        "Sale requested by user {} with {} item(s)",
        user.user_id,
        request.items.len()
    );

    let response = state.sale_service.create_sale(user.user_id, &request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/sales
/// Paginated sale listing with date range and customer filters
#[utoipa::path(
    get,
    path = "/api/sales",
    params(
        ("start_date" = Option<String>, Query, description = "Inclusive lower bound, RFC 3339"),
        ("end_date" = Option<String>, Query, description = "Inclusive upper bound, RFC 3339"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100"),
    ),
    responses(
        (status = 200, description = "Sale listing", body = SaleListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "sales"
)]
pub async fn get_sales_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<SalesQueryParams>,
) -> Result<Json<SaleListResponse>, SaleError> {
    let validated = QueryValidator::validate(params).map_err(SaleError::ValidationError)?;

    let (data, pagination) = state.sale_service.list_sales(&validated).await?;

    Ok(Json(SaleListResponse { data, pagination }))
}

/// Handler for GET /api/sales/{id}
/// One sale with its allocation slices and derived cost figures
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(
        ("id" = Uuid, Path, description = "Sale id"),
    ),
    responses(
        (status = 200, description = "Sale detail", body = SaleResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "sales"
)]
pub async fn get_sale_by_id_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<Json<SaleResponse>, SaleError> {
    let response = state.sale_service.get_sale(sale_id).await?;

    Ok(Json(response))
}
