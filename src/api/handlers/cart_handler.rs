//! Cart handlers. Customer only.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AddToCart, CartItemResponse, CartResponse, UpdateCartItem};
use crate::errors::AppResult;
use crate::types::ApiResponse;

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/cart", get(get_cart).delete(clear_cart))
        .route("/v1/api/cart/items", post(add_to_cart))
        .route(
            "/v1/api/cart/items/:id",
            put(update_cart_item).delete(remove_from_cart),
        )
}

/// View the caller's cart
#[utoipa::path(
    get,
    path = "/v1/api/cart",
    tag = "Cart",
    responses((status = 200, description = "Cart with items and total", body = CartResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<CartResponse>> {
    let cart = state.cart_service.get_cart(user.id).await?;
    Ok(ApiResponse::ok(cart))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/v1/api/cart/items",
    tag = "Cart",
    request_body = AddToCart,
    responses(
        (status = 201, description = "Line added or merged", body = CartItemResponse),
        (status = 400, description = "Insufficient stock or invalid quantity"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddToCart>,
) -> AppResult<ApiResponse<CartItemResponse>> {
    let item = state.cart_service.add_to_cart(user.id, payload).await?;
    Ok(ApiResponse::created(item))
}

/// Change a line's quantity
#[utoipa::path(
    put,
    path = "/v1/api/cart/items/{id}",
    tag = "Cart",
    params(("id" = i32, Path, description = "Cart item id")),
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Line updated", body = CartItemResponse),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCartItem>,
) -> AppResult<ApiResponse<CartItemResponse>> {
    let item = state
        .cart_service
        .update_cart_item(user.id, id, payload)
        .await?;
    Ok(ApiResponse::ok(item))
}

/// Remove a line
#[utoipa::path(
    delete,
    path = "/v1/api/cart/items/{id}",
    tag = "Cart",
    params(("id" = i32, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Line removed"),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<()>> {
    state.cart_service.remove_from_cart(user.id, id).await?;
    Ok(ApiResponse::message("Item removed from cart"))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/v1/api/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart cleared"),
        (status = 404, description = "Cart not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<()>> {
    state.cart_service.clear_cart(user.id).await?;
    Ok(ApiResponse::message("Cart cleared"))
}
