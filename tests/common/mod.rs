//! Shared fixtures: an in-memory SQLite database with the real schema, plus
//! in-process stand-ins for Redis, the payment gateway and the scheduler.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use duka::config::{Config, MpesaConfig};
use duka::domain::{
    AddToCart, MpesaPaymentResponse, Money, Password, Product, ProductInput, StkPushRequest, User,
    UserRole,
};
use duka::errors::{AppError, AppResult};
use duka::infra::{
    CacheStore, CompletionScheduler, CompletionTask, Migrator, PaymentGateway, Persistence,
    UnitOfWork,
};
use duka::services::{CartManager, CartService};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// One connection: every `sqlite::memory:` connection is its own database.
pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = SeaDatabase::connect(options)
        .await
        .expect("sqlite connection");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn persistence() -> Arc<Persistence> {
    Arc::new(Persistence::new(connect().await))
}

pub fn test_config() -> Config {
    let mut config = Config::new("sqlite::memory:", JWT_SECRET);
    config.mpesa = MpesaConfig::new(
        "174379",
        "test-passkey",
        "http://localhost/v1/api/mpesa/callback",
        0.0,
        Duration::from_millis(10),
    );
    config
}

pub async fn create_user<U: UnitOfWork>(uow: &U, email: &str, role: UserRole) -> User {
    let hash = Password::new("customer123")
        .expect("hash")
        .into_string();
    uow.users()
        .create(email.to_string(), hash, email.to_string(), role)
        .await
        .expect("user insert")
}

pub async fn create_product<U: UnitOfWork>(uow: &U, name: &str, cents: i64, stock: i32) -> Product {
    uow.products()
        .create(ProductInput {
            name: name.to_string(),
            description: format!("{} description", name),
            price: Money::from_cents(cents),
            stock,
            image_url: String::new(),
        })
        .await
        .expect("product insert")
}

/// Put `quantity` of `product` in the user's cart and return the cart id.
pub async fn fill_cart(uow: Arc<Persistence>, user_id: i32, product: Uuid, quantity: i32) -> i32 {
    let carts = CartManager::new(uow);
    let line = carts
        .add_to_cart(
            user_id,
            AddToCart {
                product_id: product,
                quantity,
            },
        )
        .await
        .expect("add to cart");
    line.cart_id
}

/// In-memory replacement for the Redis cache.
#[derive(Default)]
pub struct MemoryCache {
    products: Mutex<HashMap<Uuid, Product>>,
    counters: Mutex<HashMap<String, u64>>,
    pub unavailable: AtomicBool,
    pub product_reads: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn down() -> Arc<Self> {
        let cache = Self::default();
        cache.unavailable.store(true, Ordering::SeqCst);
        Arc::new(cache)
    }

    pub fn cached(&self, product_id: Uuid) -> Option<Product> {
        self.products.lock().unwrap().get(&product_id).cloned()
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal("cache unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn ping(&self) -> AppResult<()> {
        self.check()
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        self.check()?;
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        Ok((*count, *count <= max_requests))
    }

    async fn get_product(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        self.check()?;
        self.product_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.cached(product_id))
    }

    async fn set_product(&self, product: &Product, _ttl_seconds: u64) -> AppResult<()> {
        self.check()?;
        self.products
            .lock()
            .unwrap()
            .insert(product.product_id, product.clone());
        Ok(())
    }

    async fn invalidate_product(&self, product_id: Uuid) -> AppResult<()> {
        self.check()?;
        self.products.lock().unwrap().remove(&product_id);
        Ok(())
    }
}

/// Gateway with a fixed answer and sequential checkout ids.
pub struct FixedGateway {
    accept: bool,
    issued: AtomicUsize,
    pub last_request: Mutex<Option<StkPushRequest>>,
}

impl FixedGateway {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::with(true))
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self::with(false))
    }

    fn with(accept: bool) -> Self {
        Self {
            accept,
            issued: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl PaymentGateway for FixedGateway {
    fn request_payment(&self, request: &StkPushRequest) -> MpesaPaymentResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock().unwrap() = Some(request.clone());

        let (code, message) = if self.accept {
            ("0", "Success. Request accepted for processing")
        } else {
            ("1", "Insufficient balance")
        };
        MpesaPaymentResponse {
            merchant_request_id: format!("mr_{}", n),
            checkout_request_id: format!("ws_CO_{}", n),
            response_code: code.to_string(),
            response_message: message.to_string(),
            customer_message: message.to_string(),
        }
    }
}

/// Holds scheduled completions until the test runs them.
#[derive(Default)]
pub struct ManualScheduler {
    queued: Mutex<Vec<(String, Duration, CompletionTask)>>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn keys(&self) -> Vec<String> {
        self.queued
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.queued
            .lock()
            .unwrap()
            .iter()
            .map(|(_, delay, _)| *delay)
            .collect()
    }

    /// Run every queued completion in order.
    pub async fn run_all(&self) -> usize {
        let tasks: Vec<_> = self.queued.lock().unwrap().drain(..).collect();
        let count = tasks.len();
        for (_, _, task) in tasks {
            task.await;
        }
        count
    }
}

impl CompletionScheduler for ManualScheduler {
    fn schedule(&self, key: String, delay: Duration, task: CompletionTask) {
        self.queued.lock().unwrap().push((key, delay, task));
    }

    fn shutdown(&self) -> usize {
        let mut queued = self.queued.lock().unwrap();
        let count = queued.len();
        queued.clear();
        count
    }
}
