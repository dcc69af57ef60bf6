//! Repository layer - Data access abstraction
//!
//! Each store borrows a SeaORM connection, so the same queries run against
//! the pool or inside a unit-of-work transaction.

pub(crate) mod entities;
mod cart_repository;
mod order_repository;
mod payment_repository;
mod product_repository;
mod user_repository;

pub use cart_repository::CartStore;
pub use order_repository::OrderStore;
pub use payment_repository::PaymentStore;
pub use product_repository::ProductStore;
pub use user_repository::UserStore;
