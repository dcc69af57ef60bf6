//! Catalog handlers.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{ProductInput, ProductQuery, ProductResponse};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Paginated};

/// Catalog reads, open to everyone.
pub fn product_public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/product", get(search_products))
        .route("/v1/api/product/:id", get(get_product))
}

/// Catalog management, admin only.
pub fn product_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/product", axum::routing::post(create_product))
        .route(
            "/v1/api/product/:id",
            axum::routing::put(update_product).delete(delete_product),
        )
}

/// Search the catalog
#[utoipa::path(
    get,
    path = "/v1/api/product",
    tag = "Products",
    params(ProductQuery),
    responses((status = 200, description = "Page of products"))
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<ApiResponse<Paginated<ProductResponse>>> {
    let page = state.product_service.search(query).await?;
    Ok(ApiResponse::ok(page.map(ProductResponse::from)))
}

/// Get a product by its external id
#[utoipa::path(
    get,
    path = "/v1/api/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.find_by_id(id).await?;
    Ok(ApiResponse::ok(product.into()))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/v1/api/product",
    tag = "Products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.create(payload).await?;
    Ok(ApiResponse::created(product.into()))
}

/// Replace a product's details
#[utoipa::path(
    put,
    path = "/v1/api/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.update(id, payload).await?;
    Ok(ApiResponse::ok(product.into()))
}

/// Delete a product that no order references
#[utoipa::path(
    delete,
    path = "/v1/api/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "Product is referenced by orders"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.product_service.delete(id).await?;
    Ok(ApiResponse::message("Product deleted"))
}
