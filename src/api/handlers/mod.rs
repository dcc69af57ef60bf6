//! HTTP request handlers.

pub mod auth_handler;
pub mod cart_handler;
pub mod mpesa_handler;
pub mod order_handler;
pub mod product_handler;
pub mod seed_handler;

pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use mpesa_handler::{mpesa_routes, mpesa_webhook_routes};
pub use order_handler::{order_admin_routes, order_routes};
pub use product_handler::{product_admin_routes, product_public_routes};
pub use seed_handler::seed_routes;
