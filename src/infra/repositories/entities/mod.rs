//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod user;
