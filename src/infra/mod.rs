//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and stores
//! - Redis cache
//! - Simulated M-Pesa gateway and its completion scheduler
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod mpesa;
pub mod repositories;
pub mod scheduler;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use mpesa::{PaymentGateway, SimulatedGateway};
pub use repositories::{CartStore, OrderStore, PaymentStore, ProductStore, UserStore};
pub use scheduler::{CompletionScheduler, CompletionTask, TokioCompletionScheduler};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
#[cfg(any(test, feature = "test-utils"))]
pub use mpesa::MockPaymentGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use scheduler::MockCompletionScheduler;
