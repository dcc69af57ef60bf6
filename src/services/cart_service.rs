//! Cart service.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{AddToCart, CartItemResponse, CartLine, CartResponse, UpdateCartItem};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartService: Send + Sync {
    /// The caller's cart; an empty view when none exists yet.
    async fn get_cart(&self, user_id: i32) -> AppResult<CartResponse>;

    /// Add a product, merging into an existing line for the same product.
    async fn add_to_cart(&self, user_id: i32, request: AddToCart) -> AppResult<CartItemResponse>;

    async fn update_cart_item(
        &self,
        user_id: i32,
        item_id: i32,
        request: UpdateCartItem,
    ) -> AppResult<CartItemResponse>;

    async fn remove_from_cart(&self, user_id: i32, item_id: i32) -> AppResult<()>;

    /// Delete every line; the cart itself is kept.
    async fn clear_cart(&self, user_id: i32) -> AppResult<()>;
}

pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get_cart(&self, user_id: i32) -> AppResult<CartResponse> {
        let carts = self.uow.carts();

        let Some(cart) = carts.find_by_user(user_id).await? else {
            return Ok(CartResponse::empty(user_id));
        };

        let lines = carts.lines(cart.id).await?;
        CartResponse::new(cart, lines)
    }

    async fn add_to_cart(&self, user_id: i32, request: AddToCart) -> AppResult<CartItemResponse> {
        self.uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let carts = ctx.carts();
                    let cart = carts.get_or_create(user_id).await?;
                    let product = ctx.products().get_by_product_id(request.product_id).await?;

                    if !product.has_stock_for(request.quantity) {
                        return Err(AppError::validation("insufficient stock"));
                    }

                    let item = match carts.find_item(cart.id, product.product_id).await? {
                        Some(existing) => {
                            let quantity = existing
                                .quantity
                                .checked_add(request.quantity)
                                .ok_or_else(|| AppError::validation("quantity is out of range"))?;
                            if !product.has_stock_for(quantity) {
                                return Err(AppError::validation(
                                    "insufficient stock for updated quantity",
                                ));
                            }
                            carts.set_item_quantity(existing.id, quantity).await?
                        }
                        None => {
                            carts
                                .add_item(cart.id, product.product_id, request.quantity, product.price)
                                .await?
                        }
                    };

                    tracing::debug!(
                        user_id,
                        cart_id = cart.id,
                        product_id = %product.product_id,
                        quantity = item.quantity,
                        "Cart line saved"
                    );
                    Ok(CartItemResponse::from(CartLine { item, product }))
                })
            })
            .await
    }

    async fn update_cart_item(
        &self,
        user_id: i32,
        item_id: i32,
        request: UpdateCartItem,
    ) -> AppResult<CartItemResponse> {
        let carts = self.uow.carts();
        let item = carts
            .find_item_for_user(item_id, user_id)
            .await?
            .ok_or_not_found("Cart item")?;

        let product = self.uow.products().get_by_product_id(item.product_id).await?;
        if !product.has_stock_for(request.quantity) {
            return Err(AppError::validation("insufficient stock"));
        }

        let item = carts.set_item_quantity(item.id, request.quantity).await?;
        Ok(CartItemResponse::from(CartLine { item, product }))
    }

    async fn remove_from_cart(&self, user_id: i32, item_id: i32) -> AppResult<()> {
        let carts = self.uow.carts();
        let item = carts
            .find_item_for_user(item_id, user_id)
            .await?
            .ok_or_not_found("Cart item")?;

        carts.remove_item(item.id).await
    }

    async fn clear_cart(&self, user_id: i32) -> AppResult<()> {
        let carts = self.uow.carts();
        let cart = carts.get_by_user(user_id).await?;

        let removed = carts.clear(cart.id).await?;
        tracing::debug!(user_id, cart_id = cart.id, removed, "Cart cleared");
        Ok(())
    }
}
