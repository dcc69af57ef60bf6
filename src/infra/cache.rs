//! Redis cache implementation.
//!
//! Read-through storage for catalog lookups and the fixed-window counters
//! behind the rate-limit middleware. Never authoritative: stock decisions
//! always go to the database.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{Config, CACHE_HEALTH_KEY, CACHE_PREFIX_PRODUCT, CACHE_PREFIX_RATE_LIMIT};
use crate::domain::Product;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache operations the services and middleware depend on.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Round-trip a throwaway key; used by the health endpoint.
    async fn ping(&self) -> AppResult<()>;

    /// Check and increment the counter for `identifier`.
    /// Returns `(current_count, is_allowed)`.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    async fn get_product(&self, product_id: Uuid) -> AppResult<Option<Product>>;

    async fn set_product(&self, product: &Product, ttl_seconds: u64) -> AppResult<()>;

    async fn invalidate_product(&self, product_id: Uuid) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");
        Ok(Self { connection })
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn ping(&self) -> AppResult<()> {
        self.set_with_ttl(CACHE_HEALTH_KEY, &"ok", 10).await?;
        let _: Option<String> = self.get(CACHE_HEALTH_KEY).await?;
        Ok(())
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(&key).await.map_err(cache_error)?;

        if !exists {
            let _: () = conn
                .set_ex(&key, 1i64, window_seconds)
                .await
                .map_err(cache_error)?;
            return Ok((1, true));
        }

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        let count = count as u64;

        Ok((count, count <= max_requests))
    }

    async fn get_product(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        self.get(&product_key(product_id)).await
    }

    async fn set_product(&self, product: &Product, ttl_seconds: u64) -> AppResult<()> {
        self.set_with_ttl(&product_key(product.product_id), product, ttl_seconds)
            .await
    }

    async fn invalidate_product(&self, product_id: Uuid) -> AppResult<()> {
        self.delete(&product_key(product_id)).await
    }
}

fn product_key(product_id: Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_PRODUCT, product_id)
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::warn!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
