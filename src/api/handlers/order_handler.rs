//! Order handlers.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateOrder, OrderResponse, UpdateOrderStatus};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Checkout and order reads for customers.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/orders", post(create_order).get(list_orders))
        .route("/v1/api/orders/:id", get(get_order).delete(cancel_order))
}

/// Status override for admins.
pub fn order_admin_routes() -> Router<AppState> {
    Router::new().route("/v1/api/orders/:id/status", put(update_order_status))
}

/// Check out the caller's cart
#[utoipa::path(
    post,
    path = "/v1/api/orders",
    tag = "Orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 404, description = "Cart not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrder>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.create_order(user.id, payload).await?;
    Ok(ApiResponse::created(order))
}

/// The caller's orders, newest first
#[utoipa::path(
    get,
    path = "/v1/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Orders", body = [OrderResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let orders = state.order_service.list_orders(user.id).await?;
    Ok(ApiResponse::ok(orders))
}

/// One of the caller's orders
#[utoipa::path(
    get,
    path = "/v1/api/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.get_order(id, user.id).await?;
    Ok(ApiResponse::ok(order))
}

/// Cancel an order that has not shipped
#[utoipa::path(
    delete,
    path = "/v1/api/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order already shipped or delivered"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.cancel_order(id, user.id).await?;
    Ok(ApiResponse::with_message(order, "Order cancelled"))
}

/// Set an order's status
#[utoipa::path(
    put,
    path = "/v1/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatus>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.update_status(id, payload.status).await?;
    Ok(ApiResponse::ok(order))
}
