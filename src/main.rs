mod audit;
mod auth;
mod db;
mod error;
mod inventory;
mod models;
mod query;
mod sales;
mod validation;

use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use auth::{AuthenticatedUser, RequireRole};
use error::ApiError;
use inventory::InventoryService;
use models::Customer;
use sales::SaleService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        sales::create_sale_handler,
        sales::get_sales_handler,
        sales::get_sale_by_id_handler,
        inventory::get_inventory_handler,
        inventory::receive_stock_handler,
        inventory::adjust_stock_handler,
        get_customer_by_id,
    ),
    components(
        schemas(
            models::Product,
            models::Customer,
            sales::Sale,
            sales::SaleItem,
            sales::SaleItemRequest,
            sales::CreateSaleRequest,
            sales::SaleResponse,
            sales::SaleItemResponse,
            sales::SaleListResponse,
            sales::PaymentMethod,
            sales::PaymentStatus,
            inventory::ProductBatch,
            inventory::StockMovement,
            inventory::StockMovementType,
            inventory::AdjustStockRequest,
            inventory::ReceiveStockRequest,
            inventory::InventoryStatus,
            inventory::InventoryStatusResponse,
            query::Pagination,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "sales", description = "Sale transaction endpoints"),
        (name = "inventory", description = "Stock status, receipt and adjustment endpoints"),
        (name = "customers", description = "Customer lookup endpoints")
    ),
    info(
        title = "Grocery POS API",
        version = "1.0.0",
        description = "RESTful API for grocery point-of-sale checkout and batch inventory"
    )
)]
struct ApiDoc;

/// Registers the bearer token scheme referenced by the protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sale_service: SaleService,
    pub inventory_service: InventoryService,
}

/// Handler for GET /api/customers/:id
/// Looks up one customer, including the running lifetime purchase total
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
async fn get_customer_by_id(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    tracing::debug!("Fetching customer with id: {}", id);

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, phone, total_purchased, created_at
        FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Customer".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(customer))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let state = AppState {
        db: db.clone(),
        sale_service: SaleService::new(db.clone()),
        inventory_service: InventoryService::new(db),
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .route("/api/sales", post(sales::create_sale_handler))
        .route("/api/sales", get(sales::get_sales_handler))
        .route("/api/sales/:id", get(sales::get_sale_by_id_handler))
        .route("/api/inventory", get(inventory::get_inventory_handler))
        .route(
            "/api/inventory/receipts",
            post(inventory::receive_stock_handler).route_layer(middleware::from_fn(
                |request: axum::extract::Request, next: middleware::Next| {
                    RequireRole::manager().middleware(request, next)
                },
            )),
        )
        .route(
            "/api/inventory/adjustments",
            post(inventory::adjust_stock_handler).route_layer(middleware::from_fn(
                |request: axum::extract::Request, next: middleware::Next| {
                    RequireRole::manager().middleware(request, next)
                },
            )),
        )
        .route("/api/customers/:id", get(get_customer_by_id))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Grocery POS API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Grocery POS API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
