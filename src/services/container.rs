//! Service container - centralized service access.
//!
//! Handlers depend on the service traits only; `Services::from_connection`
//! is the single place where concrete implementations are wired together.

use std::sync::Arc;

use super::{
    AuthService, CartService, OrderService, PaymentService, ProductService, SeedService,
};
use crate::config::Config;
use crate::infra::{CacheStore, CompletionScheduler, Persistence, PaymentGateway};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn seed(&self) -> Arc<dyn SeedService>;
}

#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    product_service: Arc<dyn ProductService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
    payment_service: Arc<dyn PaymentService>,
    seed_service: Arc<dyn SeedService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        product_service: Arc<dyn ProductService>,
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
        payment_service: Arc<dyn PaymentService>,
        seed_service: Arc<dyn SeedService>,
    ) -> Self {
        Self {
            auth_service,
            product_service,
            cart_service,
            order_service,
            payment_service,
            seed_service,
        }
    }

    /// Wire every service over one database connection.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Arc<dyn CacheStore>,
        gateway: Arc<dyn PaymentGateway>,
        scheduler: Arc<dyn CompletionScheduler>,
    ) -> Self {
        use super::{Authenticator, CartManager, Catalog, Checkout, PaymentReconciler, Seeder};

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            product_service: Arc::new(Catalog::new(
                uow.clone(),
                cache.clone(),
                config.product_cache_ttl_seconds,
            )),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            order_service: Arc::new(Checkout::new(uow.clone(), cache)),
            payment_service: Arc::new(PaymentReconciler::new(
                uow.clone(),
                gateway,
                scheduler,
                config.mpesa.clone(),
            )),
            seed_service: Arc::new(Seeder::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn seed(&self) -> Arc<dyn SeedService> {
        self.seed_service.clone()
    }
}
