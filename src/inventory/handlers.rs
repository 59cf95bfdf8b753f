// HTTP handlers for inventory endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthenticatedUser;
use crate::inventory::{
    AdjustStockRequest, InventoryError, InventoryQueryParams, InventoryStatus, ProductBatch,
    ReceiveStockRequest, StockMovement,
};
use crate::query::Pagination;

/// Response envelope for the inventory status listing
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryStatusResponse {
    pub data: Vec<InventoryStatus>,
    pub pagination: Pagination,
}

/// Handler for GET /api/inventory
/// Per-product stock summary derived from live batches
#[utoipa::path(
    get,
    path = "/api/inventory",
    params(
        ("search" = Option<String>, Query, description = "Partial product name match"),
        ("low_stock" = Option<bool>, Query, description = "Only products at or below minimum stock"),
        ("expiring" = Option<bool>, Query, description = "Only products with stock expiring within 30 days"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u32>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Inventory status", body = InventoryStatusResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_inventory_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<InventoryQueryParams>,
) -> Result<Json<InventoryStatusResponse>, InventoryError> {
    tracing::debug!("Fetching inventory status: {:?}", params);

    let (data, pagination) = state.inventory_service.stock_status(params).await?;

    Ok(Json(InventoryStatusResponse { data, pagination }))
}

/// Handler for POST /api/inventory/receipts
/// Receives purchased stock into a batch (Manager or Admin only, enforced by
/// the RequireRole layer on the route)
#[utoipa::path(
    post,
    path = "/api/inventory/receipts",
    request_body = ReceiveStockRequest,
    responses(
        (status = 201, description = "Stock received", body = ProductBatch),
        (status = 400, description = "Invalid receipt"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn receive_stock_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ReceiveStockRequest>,
) -> Result<(StatusCode, Json<ProductBatch>), InventoryError> {
    tracing::debug!(
        "Stock receipt requested by user {}: {:?}",
        user.user_id,
        request
    );

    let batch = state
        .inventory_service
        .receive_stock(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(batch)))
}

/// Handler for POST /api/inventory/adjustments
/// Records a manual stock adjustment (Manager or Admin only, enforced by
/// the RequireRole layer on the route)
#[utoipa::path(
    post,
    path = "/api/inventory/adjustments",
    request_body = AdjustStockRequest,
    responses(
        (status = 201, description = "Adjustment recorded", body = StockMovement),
        (status = 400, description = "Invalid adjustment"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Product or batch not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn adjust_stock_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AdjustStockRequest>,
) -> Result<(StatusCode, Json<StockMovement>), InventoryError> {
    tracing::debug!(
        "Stock adjustment requested by user {}: {:?}",
        user.user_id,
        request
    );

    let movement = state
        .inventory_service
        .adjust_stock(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}
