//! Payment store.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::payment::{self, Entity as PaymentEntity};
use crate::domain::{Payment, PaymentStatus};
use crate::errors::{AppResult, OptionExt};

pub struct PaymentStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> PaymentStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, order_id: i32, transaction_id: String) -> AppResult<Payment> {
        let model = payment::ActiveModel {
            id: NotSet,
            order_id: Set(order_id),
            transaction_id: Set(transaction_id),
            status: Set(PaymentStatus::Pending.to_string()),
            paid_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Payment::try_from(model)
    }

    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>> {
        PaymentEntity::find()
            .filter(payment::Column::TransactionId.eq(transaction_id))
            .one(self.conn)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    /// The most recent payment is the authoritative one for an order.
    pub async fn latest_for_order(&self, order_id: i32) -> AppResult<Option<Payment>> {
        PaymentEntity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .order_by_desc(payment::Column::CreatedAt)
            .order_by_desc(payment::Column::Id)
            .one(self.conn)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    pub async fn has_successful_payment(&self, order_id: i32) -> AppResult<bool> {
        let count = PaymentEntity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .filter(payment::Column::Status.eq(PaymentStatus::Success.as_str()))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn update_status(
        &self,
        payment_id: i32,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Payment> {
        let existing = PaymentEntity::find_by_id(payment_id)
            .one(self.conn)
            .await?
            .ok_or_not_found("Payment")?;

        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        if paid_at.is_some() {
            active.paid_at = Set(paid_at);
        }

        let model = active.update(self.conn).await?;
        Payment::try_from(model)
    }
}
