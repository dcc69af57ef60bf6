//! Order store: orders and their item snapshots.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use super::entities::product;
use crate::domain::{Money, Order, OrderItem, OrderStatus, Product};
use crate::errors::{AppError, AppResult, OptionExt};

pub struct OrderStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> OrderStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Insert a pending order.
    pub async fn create(&self, user_id: i32, total: Money, shipping_address: String) -> AppResult<Order> {
        let model = order::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            total: Set(total.cents()),
            status: Set(OrderStatus::Pending.to_string()),
            shipping_address: Set(shipping_address),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Order::try_from(model)
    }

    pub async fn add_item(
        &self,
        order_id: i32,
        product_id: Uuid,
        quantity: i32,
        price: Money,
    ) -> AppResult<OrderItem> {
        let model = order_item::ActiveModel {
            id: NotSet,
            order_id: Set(order_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price.cents()),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(OrderItem::from(model))
    }

    /// Ownership-checked lookup; another user's order is indistinguishable from a missing one.
    pub async fn find_for_user(&self, order_id: i32, user_id: i32) -> AppResult<Option<Order>> {
        OrderEntity::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// Most recent first.
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    pub async fn items_with_products(&self, order_id: i32) -> AppResult<Vec<(OrderItem, Product)>> {
        let rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(product::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(self.conn)
            .await?;

        rows.into_iter()
            .map(|(item, product)| {
                let product = product.ok_or_else(|| {
                    AppError::internal(format!("order item {} has no product", item.id))
                })?;
                Ok((OrderItem::from(item), Product::from(product)))
            })
            .collect()
    }

    pub async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<Order> {
        let existing = OrderEntity::find_by_id(order_id)
            .one(self.conn)
            .await?
            .ok_or_not_found("Order")?;

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(status.to_string());

        let model = active.update(self.conn).await?;
        Order::try_from(model)
    }
}
