//! Payment reconciler: STK push initiation and callback handling.
//!
//! A payment moves pending -> success or pending -> failed. Callbacks are
//! idempotent: a repeated success is a no-op and a late failure never
//! overwrites a recorded success.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::config::MpesaConfig;
use crate::domain::{
    MpesaCallback, MpesaPaymentRequest, MpesaPaymentResponse, OrderStatus, PaymentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::mpesa::{build_stk_push, simulated_success_callback};
use crate::infra::{CompletionScheduler, PaymentGateway, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Start an M-Pesa payment for one of the caller's orders.
    async fn initiate_stk_push(
        &self,
        user_id: i32,
        request: MpesaPaymentRequest,
    ) -> AppResult<MpesaPaymentResponse>;

    /// Apply a gateway webhook to the matching payment.
    async fn process_callback(&self, callback: MpesaCallback) -> AppResult<()>;
}

pub struct PaymentReconciler<U: UnitOfWork> {
    uow: Arc<U>,
    gateway: Arc<dyn PaymentGateway>,
    scheduler: Arc<dyn CompletionScheduler>,
    config: MpesaConfig,
}

impl<U: UnitOfWork + 'static> PaymentReconciler<U> {
    pub fn new(
        uow: Arc<U>,
        gateway: Arc<dyn PaymentGateway>,
        scheduler: Arc<dyn CompletionScheduler>,
        config: MpesaConfig,
    ) -> Self {
        Self {
            uow,
            gateway,
            scheduler,
            config,
        }
    }

    /// Feed a synthetic success callback back in once the configured delay passes.
    fn schedule_completion(&self, checkout_request_id: String) {
        let uow = Arc::clone(&self.uow);
        let callback = simulated_success_callback(&checkout_request_id);

        self.scheduler.schedule(
            checkout_request_id.clone(),
            self.config.completion_delay,
            Box::pin(async move {
                if let Err(e) = apply_callback(uow.as_ref(), callback).await {
                    tracing::error!(
                        checkout_request_id = %checkout_request_id,
                        error = %e,
                        "Simulated payment completion failed"
                    );
                }
            }),
        );
    }
}

async fn apply_callback<U: UnitOfWork>(uow: &U, callback: MpesaCallback) -> AppResult<()> {
    uow.transaction(|ctx| {
        Box::pin(async move {
            let payments = ctx.payments();
            let payment = payments
                .find_by_transaction_id(&callback.checkout_request_id)
                .await?
                .ok_or_not_found("Payment")?;

            if callback.is_success() {
                if payment.status == PaymentStatus::Success {
                    tracing::debug!(
                        checkout_request_id = %callback.checkout_request_id,
                        "Duplicate success callback ignored"
                    );
                    return Ok(());
                }

                payments
                    .update_status(payment.id, PaymentStatus::Success, Some(Utc::now()))
                    .await?;
                ctx.orders()
                    .update_status(payment.order_id, OrderStatus::Confirmed)
                    .await?;

                tracing::info!(
                    order_id = payment.order_id,
                    checkout_request_id = %callback.checkout_request_id,
                    receipt = callback.metadata_value("MpesaReceiptNumber").unwrap_or("-"),
                    "Payment confirmed"
                );
                return Ok(());
            }

            if payment.status == PaymentStatus::Success {
                tracing::warn!(
                    order_id = payment.order_id,
                    checkout_request_id = %callback.checkout_request_id,
                    result_code = callback.result_code,
                    "Failure callback for a settled payment ignored"
                );
                return Ok(());
            }

            payments
                .update_status(payment.id, PaymentStatus::Failed, None)
                .await?;
            tracing::info!(
                order_id = payment.order_id,
                checkout_request_id = %callback.checkout_request_id,
                result_code = callback.result_code,
                result_desc = %callback.result_desc,
                "Payment failed"
            );
            Ok(())
        })
    })
    .await
}

#[async_trait]
impl<U: UnitOfWork + 'static> PaymentService for PaymentReconciler<U> {
    async fn initiate_stk_push(
        &self,
        user_id: i32,
        request: MpesaPaymentRequest,
    ) -> AppResult<MpesaPaymentResponse> {
        let payload = build_stk_push(&self.config, &request);
        tracing::debug!(?payload, "STK push payload");

        let gateway = Arc::clone(&self.gateway);
        let order_id = request.order_id;

        let response = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let order = ctx
                        .orders()
                        .find_for_user(order_id, user_id)
                        .await?
                        .ok_or_not_found("Order")?;

                    let payments = ctx.payments();
                    if payments.has_successful_payment(order.id).await? {
                        return Err(AppError::validation("order is already paid"));
                    }

                    let response = gateway.request_payment(&payload);
                    let payment = payments
                        .create(order.id, response.checkout_request_id.clone())
                        .await?;

                    if !response.is_accepted() {
                        payments
                            .update_status(payment.id, PaymentStatus::Failed, None)
                            .await?;
                    }

                    Ok(response)
                })
            })
            .await?;

        if response.is_accepted() {
            tracing::info!(
                order_id,
                checkout_request_id = %response.checkout_request_id,
                "STK push accepted"
            );
            self.schedule_completion(response.checkout_request_id.clone());
        } else {
            tracing::info!(
                order_id,
                checkout_request_id = %response.checkout_request_id,
                reason = %response.response_message,
                "STK push declined"
            );
        }

        Ok(response)
    }

    async fn process_callback(&self, callback: MpesaCallback) -> AppResult<()> {
        apply_callback(self.uow.as_ref(), callback).await
    }
}
