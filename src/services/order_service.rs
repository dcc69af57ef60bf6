//! Checkout orchestrator and order reads.
//!
//! `create_order` turns the caller's cart into an order inside one
//! transaction: order row, item snapshots, conditional stock decrements and
//! the cart purge either all commit or none do.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

use crate::domain::{
    CreateOrder, Money, Order, OrderItemResponse, OrderResponse, OrderStatus, PaymentResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, OrderStore, PaymentStore, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Check out the caller's cart.
    async fn create_order(&self, user_id: i32, request: CreateOrder) -> AppResult<OrderResponse>;

    /// Owner-only read; other users' orders are reported as missing.
    async fn get_order(&self, order_id: i32, user_id: i32) -> AppResult<OrderResponse>;

    /// Most recent first.
    async fn list_orders(&self, user_id: i32) -> AppResult<Vec<OrderResponse>>;

    /// Admin override; any status may be set.
    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<OrderResponse>;

    async fn cancel_order(&self, order_id: i32, user_id: i32) -> AppResult<OrderResponse>;
}

pub struct Checkout<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<U: UnitOfWork> Checkout<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }

    /// Drop cached catalog entries whose stock the order just changed.
    async fn evict_products(&self, order: &OrderResponse) {
        for item in &order.order_items {
            if let Err(e) = self.cache.invalidate_product(item.product_id).await {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "Failed to invalidate cached product after checkout"
                );
            }
        }
    }
}

/// Attach items (with products) and the latest payment.
async fn hydrate<C: ConnectionTrait>(
    orders: &OrderStore<'_, C>,
    payments: &PaymentStore<'_, C>,
    order: Order,
) -> AppResult<OrderResponse> {
    let items = orders
        .items_with_products(order.id)
        .await?
        .into_iter()
        .map(|(item, product)| OrderItemResponse::new(item, product))
        .collect();
    let payment = payments
        .latest_for_order(order.id)
        .await?
        .map(PaymentResponse::from);

    Ok(OrderResponse::new(order, items, payment))
}

#[async_trait]
impl<U: UnitOfWork> OrderService for Checkout<U> {
    async fn create_order(&self, user_id: i32, request: CreateOrder) -> AppResult<OrderResponse> {
        let response = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let carts = ctx.carts();
                    let cart = carts.get_by_user(user_id).await?;
                    if cart.id != request.cart_id {
                        return Err(AppError::not_found("Cart"));
                    }

                    let lines = carts.lines(cart.id).await?;
                    if lines.is_empty() {
                        return Err(AppError::validation("cart is empty"));
                    }

                    let total = Money::total(lines.iter().map(|line| line.item.line_total()))?;

                    let orders = ctx.orders();
                    let products = ctx.products();
                    let order = orders
                        .create(user_id, total, request.shipping_address)
                        .await?;

                    // The conditional decrement is the stock check: the
                    // joined product row may already be stale.
                    for line in &lines {
                        let quantity = line.item.quantity;
                        if !products
                            .decrement_stock(line.product.product_id, quantity)
                            .await?
                        {
                            return Err(AppError::insufficient_stock(&line.product.name));
                        }

                        orders
                            .add_item(order.id, line.product.product_id, quantity, line.item.price)
                            .await?;
                    }

                    carts.clear(cart.id).await?;

                    hydrate(&orders, &ctx.payments(), order).await
                })
            })
            .await;

        match &response {
            Ok(order) => {
                tracing::info!(
                    order_id = order.id,
                    user_id,
                    total = %order.total,
                    items = order.order_items.len(),
                    "Order placed"
                );
                self.evict_products(order).await;
            }
            Err(e) => tracing::info!(user_id, error = %e, "Checkout rejected"),
        }

        response
    }

    async fn get_order(&self, order_id: i32, user_id: i32) -> AppResult<OrderResponse> {
        let orders = self.uow.orders();
        let order = orders
            .find_for_user(order_id, user_id)
            .await?
            .ok_or_not_found("Order")?;

        hydrate(&orders, &self.uow.payments(), order).await
    }

    async fn list_orders(&self, user_id: i32) -> AppResult<Vec<OrderResponse>> {
        let orders = self.uow.orders();
        let payments = self.uow.payments();

        let mut responses = Vec::new();
        for order in orders.list_for_user(user_id).await? {
            responses.push(hydrate(&orders, &payments, order).await?);
        }
        Ok(responses)
    }

    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<OrderResponse> {
        let orders = self.uow.orders();
        let order = orders.update_status(order_id, status).await?;

        tracing::info!(order_id, status = %status, "Order status updated");
        hydrate(&orders, &self.uow.payments(), order).await
    }

    async fn cancel_order(&self, order_id: i32, user_id: i32) -> AppResult<OrderResponse> {
        self.uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let orders = ctx.orders();
                    let order = orders
                        .find_for_user(order_id, user_id)
                        .await?
                        .ok_or_not_found("Order")?;

                    if !order.status.is_cancellable() {
                        return Err(AppError::validation(format!(
                            "order cannot be cancelled once {}",
                            order.status
                        )));
                    }

                    let order = orders.update_status(order.id, OrderStatus::Cancelled).await?;
                    tracing::info!(order_id, user_id, "Order cancelled");
                    hydrate(&orders, &ctx.payments(), order).await
                })
            })
            .await
    }
}
