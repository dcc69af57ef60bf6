//! Shopping cart aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{Money, Product, ProductResponse};
use crate::errors::AppResult;

/// One cart per user, created lazily on first add
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Cart line; `price` is the unit price captured when the line was added
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> AppResult<Money> {
        self.price.times(self.quantity)
    }
}

/// Cart line joined with its product
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddToCart {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 2, minimum = 1)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItem {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 3, minimum = 1)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: Uuid,
    pub product: ProductResponse,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.item.id,
            cart_id: line.item.cart_id,
            product_id: line.item.product_id,
            product: line.product.into(),
            quantity: line.item.quantity,
            price: line.item.price,
            created_at: line.item.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartResponse {
    /// Zero when the user has never added anything
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<CartItemResponse>,
    #[schema(value_type = String, example = "25.00")]
    pub total: Money,
    pub created_at: Option<DateTime<Utc>>,
}

impl CartResponse {
    pub fn empty(user_id: i32) -> Self {
        Self {
            id: 0,
            user_id,
            items: Vec::new(),
            total: Money::ZERO,
            created_at: None,
        }
    }

    pub fn new(cart: Cart, lines: Vec<CartLine>) -> AppResult<Self> {
        let total = Money::total(lines.iter().map(|line| line.item.line_total()))?;
        Ok(Self {
            id: cart.id,
            user_id: cart.user_id,
            items: lines.into_iter().map(CartItemResponse::from).collect(),
            total,
            created_at: Some(cart.created_at),
        })
    }
}
