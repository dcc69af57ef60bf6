//! Catalog service: public search and lookup, admin management.
//!
//! Lookups by external id are read-through cached in Redis. The cache is a
//! convenience only; any cache failure degrades to a database read.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Product, ProductInput, ProductQuery};
use crate::errors::{AppError, AppResult};
use crate::infra::{CacheStore, UnitOfWork};
use crate::types::Paginated;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, input: ProductInput) -> AppResult<Product>;

    async fn update(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product>;

    /// Rejected while any order line references the product.
    async fn delete(&self, product_id: Uuid) -> AppResult<()>;

    async fn find_by_id(&self, product_id: Uuid) -> AppResult<Product>;

    async fn search(&self, query: ProductQuery) -> AppResult<Paginated<Product>>;
}

pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    cache_ttl_seconds: u64,
}

impl<U: UnitOfWork> Catalog<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>, cache_ttl_seconds: u64) -> Self {
        Self {
            uow,
            cache,
            cache_ttl_seconds,
        }
    }

    async fn evict(&self, product_id: Uuid) {
        if let Err(e) = self.cache.invalidate_product(product_id).await {
            tracing::warn!(%product_id, error = %e, "Failed to invalidate cached product");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for Catalog<U> {
    async fn create(&self, input: ProductInput) -> AppResult<Product> {
        let product = self.uow.products().create(input).await?;
        tracing::info!(product_id = %product.product_id, "Product created");
        Ok(product)
    }

    async fn update(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        let product = self.uow.products().update(product_id, input).await?;
        self.evict(product_id).await;

        tracing::info!(%product_id, "Product updated");
        Ok(product)
    }

    async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let products = ctx.products();
                    products.get_by_product_id(product_id).await?;

                    if products.is_referenced_by_orders(product_id).await? {
                        return Err(AppError::validation(
                            "Product is referenced by existing orders and cannot be deleted",
                        ));
                    }

                    products.delete(product_id).await
                })
            })
            .await?;

        self.evict(product_id).await;
        tracing::info!(%product_id, "Product deleted");
        Ok(())
    }

    async fn find_by_id(&self, product_id: Uuid) -> AppResult<Product> {
        match self.cache.get_product(product_id).await {
            Ok(Some(product)) => return Ok(product),
            Ok(None) => {}
            Err(e) => tracing::warn!(%product_id, error = %e, "Product cache read failed"),
        }

        let product = self.uow.products().get_by_product_id(product_id).await?;

        if let Err(e) = self
            .cache
            .set_product(&product, self.cache_ttl_seconds)
            .await
        {
            tracing::warn!(%product_id, error = %e, "Product cache write failed");
        }

        Ok(product)
    }

    async fn search(&self, query: ProductQuery) -> AppResult<Paginated<Product>> {
        let (products, total) = self.uow.products().search(&query).await?;
        Ok(Paginated::new(products, query.page(), query.limit(), total))
    }
}
