//! Cart store.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::JoinType;
use uuid::Uuid;

use super::entities::cart::{self, Entity as CartEntity};
use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::product;
use crate::domain::{Cart, CartItem, CartLine, Money, Product};
use crate::errors::{AppError, AppResult, OptionExt};

pub struct CartStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CartStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_user(&self, user_id: i32) -> AppResult<Option<Cart>> {
        let result = CartEntity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?;

        Ok(result.map(Cart::from))
    }

    /// A miss is `NotFound`.
    pub async fn get_by_user(&self, user_id: i32) -> AppResult<Cart> {
        self.find_by_user(user_id).await?.ok_or_not_found("Cart")
    }

    pub async fn get_or_create(&self, user_id: i32) -> AppResult<Cart> {
        if let Some(existing) = self.find_by_user(user_id).await? {
            return Ok(existing);
        }

        let model = cart::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        tracing::debug!(user_id, cart_id = model.id, "Cart created");
        Ok(Cart::from(model))
    }

    /// Items of a cart joined with their products, oldest line first.
    pub async fn lines(&self, cart_id: i32) -> AppResult<Vec<CartLine>> {
        let rows = CartItemEntity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .find_also_related(product::Entity)
            .order_by_asc(cart_item::Column::Id)
            .all(self.conn)
            .await?;

        rows.into_iter()
            .map(|(item, product)| {
                let product = product.ok_or_else(|| {
                    AppError::internal(format!("cart item {} has no product", item.id))
                })?;
                Ok(CartLine {
                    item: CartItem::from(item),
                    product: Product::from(product),
                })
            })
            .collect()
    }

    pub async fn find_item(&self, cart_id: i32, product_id: Uuid) -> AppResult<Option<CartItem>> {
        let result = CartItemEntity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(self.conn)
            .await?;

        Ok(result.map(CartItem::from))
    }

    /// Item lookup restricted to the caller's own cart.
    pub async fn find_item_for_user(&self, item_id: i32, user_id: i32) -> AppResult<Option<CartItem>> {
        let result = CartItemEntity::find_by_id(item_id)
            .join(JoinType::InnerJoin, cart_item::Relation::Cart.def())
            .filter(cart::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?;

        Ok(result.map(CartItem::from))
    }

    pub async fn add_item(
        &self,
        cart_id: i32,
        product_id: Uuid,
        quantity: i32,
        price: Money,
    ) -> AppResult<CartItem> {
        let model = cart_item::ActiveModel {
            id: NotSet,
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price.cents()),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(CartItem::from(model))
    }

    pub async fn set_item_quantity(&self, item_id: i32, quantity: i32) -> AppResult<CartItem> {
        let existing = CartItemEntity::find_by_id(item_id)
            .one(self.conn)
            .await?
            .ok_or_not_found("Cart item")?;

        let mut active: cart_item::ActiveModel = existing.into();
        active.quantity = Set(quantity);

        let model = active.update(self.conn).await?;
        Ok(CartItem::from(model))
    }

    pub async fn remove_item(&self, item_id: i32) -> AppResult<()> {
        let result = CartItemEntity::delete_by_id(item_id).exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Cart item"));
        }
        Ok(())
    }

    /// Delete every line of the cart; the cart row itself is kept.
    pub async fn clear(&self, cart_id: i32) -> AppResult<u64> {
        let result = CartItemEntity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
