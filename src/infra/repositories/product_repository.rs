//! Product store: catalog lookups, search and the conditional stock decrement.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::order_item;
use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::{Product, ProductInput, ProductQuery, SortDirection, SortField};
use crate::errors::{AppError, AppResult, OptionExt};

pub struct ProductStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ProductStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Lookup by external id; a miss is `None`.
    pub async fn find_by_product_id(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(self.conn)
            .await?;

        Ok(result.map(Product::from))
    }

    /// Lookup by external id; a miss is `NotFound`.
    pub async fn get_by_product_id(&self, product_id: Uuid) -> AppResult<Product> {
        self.find_by_product_id(product_id)
            .await?
            .ok_or_not_found("Product")
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .one(self.conn)
            .await?;

        Ok(result.map(Product::from))
    }

    /// Filtered, sorted page of the catalog plus the total match count.
    pub async fn search(&self, query: &ProductQuery) -> AppResult<(Vec<Product>, u64)> {
        let mut select = ProductEntity::find();

        if let Some(name) = query.name_filter() {
            // Case-insensitive on every backend
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                    .like(format!("%{}%", name.to_lowercase())),
            );
        }
        if let Some(min) = query.min_price() {
            select = select.filter(product::Column::Price.gte(min.cents()));
        }
        if let Some(max) = query.max_price() {
            select = select.filter(product::Column::Price.lte(max.cents()));
        }
        if query.in_stock == Some(true) {
            select = select.filter(product::Column::Stock.gt(0));
        }

        let (field, direction) = query.sort();
        let column = match field {
            SortField::Name => product::Column::Name,
            SortField::Price => product::Column::Price,
            SortField::CreatedAt => product::Column::CreatedAt,
        };
        let order = match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select = select
            .order_by(column, order.clone())
            .order_by(product::Column::Id, order);

        let paginator = select.paginate(self.conn, query.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        let model = ActiveModel {
            id: NotSet,
            product_id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price.cents()),
            stock: Set(input.stock),
            image_url: Set(input.image_url),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(Product::from(model))
    }

    pub async fn update(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        let existing = ProductEntity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(self.conn)
            .await?
            .ok_or_not_found("Product")?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.price = Set(input.price.cents());
        active.stock = Set(input.stock);
        active.image_url = Set(input.image_url);

        let model = active.update(self.conn).await?;
        Ok(Product::from(model))
    }

    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let result = ProductEntity::delete_many()
            .filter(product::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Product"));
        }
        Ok(())
    }

    /// Whether any order line points at this product.
    pub async fn is_referenced_by_orders(&self, product_id: Uuid) -> AppResult<bool> {
        let count = order_item::Entity::find()
            .filter(order_item::Column::ProductId.eq(product_id))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    /// `stock = stock - quantity WHERE stock >= quantity` as one statement.
    ///
    /// Returns `false` when the guard rejected the update.
    pub async fn decrement_stock(&self, product_id: Uuid, quantity: i32) -> AppResult<bool> {
        let result = ProductEntity::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(quantity),
            )
            .filter(product::Column::ProductId.eq(product_id))
            .filter(product::Column::Stock.gte(quantity))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
