//! Order aggregate: orders, order item snapshots and status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{Money, PaymentResponse, Product, ProductResponse};
use crate::config::{
    ORDER_STATUS_CANCELLED, ORDER_STATUS_CONFIRMED, ORDER_STATUS_DELIVERED, ORDER_STATUS_PENDING,
    ORDER_STATUS_PROCESSING, ORDER_STATUS_SHIPPED,
};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => ORDER_STATUS_PENDING,
            OrderStatus::Confirmed => ORDER_STATUS_CONFIRMED,
            OrderStatus::Processing => ORDER_STATUS_PROCESSING,
            OrderStatus::Shipped => ORDER_STATUS_SHIPPED,
            OrderStatus::Delivered => ORDER_STATUS_DELIVERED,
            OrderStatus::Cancelled => ORDER_STATUS_CANCELLED,
        }
    }

    /// Orders that have left the warehouse can no longer be cancelled.
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ORDER_STATUS_PENDING => Ok(OrderStatus::Pending),
            ORDER_STATUS_CONFIRMED => Ok(OrderStatus::Confirmed),
            ORDER_STATUS_PROCESSING => Ok(OrderStatus::Processing),
            ORDER_STATUS_SHIPPED => Ok(OrderStatus::Shipped),
            ORDER_STATUS_DELIVERED => Ok(OrderStatus::Delivered),
            ORDER_STATUS_CANCELLED => Ok(OrderStatus::Cancelled),
            other => Err(AppError::internal(format!("unknown order status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

/// Historical line; price and quantity never change after checkout
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(range(min = 1, message = "cart_id is required"))]
    #[schema(example = 1)]
    pub cart_id: i32,
    #[validate(length(min = 1, message = "shipping_address is required"))]
    #[schema(example = "Moi Avenue 12, Nairobi")]
    pub shipping_address: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub order_id: i32,
    pub product_id: Uuid,
    pub product: ProductResponse,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderItemResponse {
    pub fn new(item: OrderItem, product: Product) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            product: product.into(),
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = String, example = "25.00")]
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub order_items: Vec<OrderItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
}

impl OrderResponse {
    pub fn new(
        order: Order,
        order_items: Vec<OrderItemResponse>,
        payment: Option<PaymentResponse>,
    ) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
            order_items,
            payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_update_status_payload_is_enum_checked() {
        let ok: UpdateOrderStatus = serde_json::from_str(r#"{"status":"delivered"}"#).unwrap();
        assert_eq!(ok.status, OrderStatus::Delivered);

        assert!(serde_json::from_str::<UpdateOrderStatus>(r#"{"status":"teleported"}"#).is_err());
    }
}
