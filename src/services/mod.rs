//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure behind traits so the
//! HTTP layer can be tested against mocks. All persistence goes through the
//! Unit of Work.

mod auth_service;
mod cart_service;
pub mod container;
mod order_service;
mod payment_service;
mod product_service;
mod seed_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, LoginResponse};
pub use cart_service::{CartManager, CartService};
pub use order_service::{Checkout, OrderService};
pub use payment_service::{PaymentReconciler, PaymentService};
pub use product_service::{Catalog, ProductService};
pub use seed_service::{SeedReport, SeedService, Seeder};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_service::MockCartService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use order_service::MockOrderService;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
#[cfg(any(test, feature = "test-utils"))]
pub use product_service::MockProductService;
#[cfg(any(test, feature = "test-utils"))]
pub use seed_service::MockSeedService;
