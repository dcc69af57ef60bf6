//! Unit of Work pattern implementation.
//!
//! Centralizes store access and transaction lifecycle. Stores borrow either
//! the pooled connection or an open transaction, so multi-aggregate
//! workflows such as checkout commit or roll back as one.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

use super::repositories::{CartStore, OrderStore, PaymentStore, ProductStore, UserStore};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly due to generic methods; service tests run against
/// [`Persistence`] over an in-memory database instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> UserStore<'_, DatabaseConnection>;

    fn products(&self) -> ProductStore<'_, DatabaseConnection>;

    fn carts(&self) -> CartStore<'_, DatabaseConnection>;

    fn orders(&self) -> OrderStore<'_, DatabaseConnection>;

    fn payments(&self) -> PaymentStore<'_, DatabaseConnection>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Store access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> UserStore<'a, DatabaseTransaction> {
        UserStore::new(self.txn)
    }

    pub fn products(&self) -> ProductStore<'a, DatabaseTransaction> {
        ProductStore::new(self.txn)
    }

    pub fn carts(&self) -> CartStore<'a, DatabaseTransaction> {
        CartStore::new(self.txn)
    }

    pub fn orders(&self) -> OrderStore<'a, DatabaseTransaction> {
        OrderStore::new(self.txn)
    }

    pub fn payments(&self) -> PaymentStore<'a, DatabaseTransaction> {
        PaymentStore::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> UserStore<'_, DatabaseConnection> {
        UserStore::new(&self.db)
    }

    fn products(&self) -> ProductStore<'_, DatabaseConnection> {
        ProductStore::new(&self.db)
    }

    fn carts(&self) -> CartStore<'_, DatabaseConnection> {
        CartStore::new(&self.db)
    }

    fn orders(&self) -> OrderStore<'_, DatabaseConnection> {
        OrderStore::new(&self.db)
    }

    fn payments(&self) -> PaymentStore<'_, DatabaseConnection> {
        PaymentStore::new(&self.db)
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }
}
