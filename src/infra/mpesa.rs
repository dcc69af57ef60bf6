//! Simulated M-Pesa STK push gateway.
//!
//! No request ever leaves the process. The outbound payload is still built
//! (and logged) so the shape matches what a live Daraja integration sends.

use base64::prelude::*;
use chrono::{Local, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::{
    MpesaConfig, MPESA_CORRELATION_ID_LENGTH, MPESA_RECEIPT_LENGTH, MPESA_RESPONSE_ACCEPTED,
    MPESA_RESPONSE_DECLINED, MPESA_TRANSACTION_TYPE,
};
use crate::domain::{
    CallbackItem, CallbackMetadata, MpesaCallback, MpesaPaymentRequest, MpesaPaymentResponse,
    StkPushRequest,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outbound side of the payment flow.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PaymentGateway: Send + Sync {
    /// Submit an STK push and return the gateway's synchronous answer.
    fn request_payment(&self, request: &StkPushRequest) -> MpesaPaymentResponse;
}

/// Accepts most requests; declines a configurable fraction as "insufficient balance".
pub struct SimulatedGateway {
    failure_rate: f64,
}

impl SimulatedGateway {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    fn should_decline(&self) -> bool {
        rand::rng().random::<f64>() < self.failure_rate
    }
}

impl PaymentGateway for SimulatedGateway {
    fn request_payment(&self, request: &StkPushRequest) -> MpesaPaymentResponse {
        tracing::debug!(
            account_reference = %request.account_reference,
            amount = %request.amount,
            "Simulating STK push"
        );

        let merchant_request_id = random_string(MPESA_CORRELATION_ID_LENGTH);
        let checkout_request_id = random_string(MPESA_CORRELATION_ID_LENGTH);

        if self.should_decline() {
            return MpesaPaymentResponse {
                merchant_request_id,
                checkout_request_id,
                response_code: MPESA_RESPONSE_DECLINED.to_string(),
                response_message: "Insufficient balance".to_string(),
                customer_message: "You have insufficient balance to complete this transaction"
                    .to_string(),
            };
        }

        MpesaPaymentResponse {
            merchant_request_id,
            checkout_request_id,
            response_code: MPESA_RESPONSE_ACCEPTED.to_string(),
            response_message: "Success. Request accepted for processing".to_string(),
            customer_message: "Please complete the payment on your phone".to_string(),
        }
    }
}

/// Gateway timestamp, local time as `YYYYMMDDHHMMSS`.
pub fn generate_timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// STK password: base64(sha256(shortcode + passkey + timestamp)).
pub fn generate_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(shortcode.as_bytes());
    hasher.update(passkey.as_bytes());
    hasher.update(timestamp.as_bytes());
    BASE64_STANDARD.encode(hasher.finalize())
}

pub fn random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Build the Daraja payload for an initiation request.
pub fn build_stk_push(config: &MpesaConfig, request: &MpesaPaymentRequest) -> StkPushRequest {
    let timestamp = generate_timestamp();
    let password = generate_password(&config.shortcode, config.passkey(), &timestamp);

    StkPushRequest {
        business_short_code: config.shortcode.clone(),
        password,
        timestamp,
        transaction_type: MPESA_TRANSACTION_TYPE.to_string(),
        amount: request.amount,
        party_a: request.phone_number.clone(),
        party_b: config.shortcode.clone(),
        phone_number: request.phone_number.clone(),
        call_back_url: config.callback_url.clone(),
        account_reference: format!("Order #{}", request.order_id),
        transaction_desc: "Payment for order".to_string(),
    }
}

/// The webhook a completed STK push would deliver.
pub fn simulated_success_callback(checkout_request_id: &str) -> MpesaCallback {
    MpesaCallback {
        merchant_request_id: random_string(MPESA_CORRELATION_ID_LENGTH),
        checkout_request_id: checkout_request_id.to_string(),
        result_code: 0,
        result_desc: "The service request is processed successfully".to_string(),
        callback_metadata: Some(CallbackMetadata {
            item: vec![
                CallbackItem {
                    name: "MpesaReceiptNumber".to_string(),
                    value: random_string(MPESA_RECEIPT_LENGTH).to_uppercase(),
                },
                CallbackItem {
                    name: "TransactionDate".to_string(),
                    value: Utc::now().timestamp().to_string(),
                },
            ],
        }),
    }
}
