//! Application state shared by every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, CompletionScheduler, Database, PaymentGateway};
use crate::services::{
    AuthService, CartService, OrderService, PaymentService, ProductService, SeedService,
    ServiceContainer, Services,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub product_service: Arc<dyn ProductService>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub seed_service: Arc<dyn SeedService>,
    /// Redis cache (rate limiting and health)
    pub cache: Arc<dyn CacheStore>,
    pub database: Arc<Database>,
    pub cors_allowed_origins: Vec<String>,
}

impl AppState {
    /// Wire the production services over the given infrastructure.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<dyn CacheStore>,
        gateway: Arc<dyn PaymentGateway>,
        scheduler: Arc<dyn CompletionScheduler>,
        config: Config,
    ) -> Self {
        let cors_allowed_origins = config.cors_allowed_origins.clone();
        let container = Services::from_connection(
            database.get_connection(),
            config,
            Arc::clone(&cache),
            gateway,
            scheduler,
        );

        Self::new(&container, cache, database, cors_allowed_origins)
    }

    /// Build state from any service container (tests pass a mock).
    pub fn new(
        services: &dyn ServiceContainer,
        cache: Arc<dyn CacheStore>,
        database: Arc<Database>,
        cors_allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            product_service: services.products(),
            cart_service: services.carts(),
            order_service: services.orders(),
            payment_service: services.payments(),
            seed_service: services.seed(),
            cache,
            database,
            cors_allowed_origins,
        }
    }
}
