//! Duka - e-commerce storefront API.
//!
//! Catalog browsing, per-user carts, transactional checkout with stock
//! reservation, and an M-Pesa style payment flow backed by a simulated
//! gateway that confirms orders through an asynchronous callback.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate` and `seed`
//! - **config**: environment settings and constants
//! - **domain**: entities, money, request and response shapes
//! - **services**: use cases behind mockable traits
//! - **infra**: database, Redis cache, payment gateway, completion scheduler
//! - **api**: handlers, middleware, routes and OpenAPI document
//! - **types**: response envelope and pagination
//! - **errors**: error taxonomy mapped to HTTP statuses
//!
//! # CLI Usage
//!
//! ```bash
//! cargo run -- migrate up
//! cargo run -- seed all
//! cargo run -- serve --port 3000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Money, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
