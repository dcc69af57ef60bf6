//! Payments and the M-Pesa wire shapes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::config::{
    PAYMENT_STATUS_CANCELLED, PAYMENT_STATUS_FAILED, PAYMENT_STATUS_PENDING,
    PAYMENT_STATUS_SUCCESS,
};
use crate::errors::AppError;

/// Kenyan MSISDN in international format, e.g. 254712345678
static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^254\d{9}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => PAYMENT_STATUS_PENDING,
            PaymentStatus::Success => PAYMENT_STATUS_SUCCESS,
            PaymentStatus::Failed => PAYMENT_STATUS_FAILED,
            PaymentStatus::Cancelled => PAYMENT_STATUS_CANCELLED,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PAYMENT_STATUS_PENDING => Ok(PaymentStatus::Pending),
            PAYMENT_STATUS_SUCCESS => Ok(PaymentStatus::Success),
            PAYMENT_STATUS_FAILED => Ok(PaymentStatus::Failed),
            PAYMENT_STATUS_CANCELLED => Ok(PaymentStatus::Cancelled),
            other => Err(AppError::internal(format!("unknown payment status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: i32,
    pub order_id: i32,
    /// Checkout request id issued at initiation
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub order_id: i32,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            order_id: payment.order_id,
            transaction_id: payment.transaction_id,
            status: payment.status,
            paid_at: payment.paid_at,
        }
    }
}

/// STK push initiation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MpesaPaymentRequest {
    #[validate(range(min = 1, message = "order_id is required"))]
    #[schema(example = 1)]
    pub order_id: i32,
    #[validate(regex(
        path = *PHONE_NUMBER,
        message = "phone_number must be 12 digits starting with 254"
    ))]
    #[schema(example = "254712345678")]
    pub phone_number: String,
    #[validate(custom(function = "at_least_one"))]
    #[schema(value_type = String, example = "1000.00")]
    pub amount: Decimal,
}

fn at_least_one(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ONE {
        let mut error = ValidationError::new("range");
        error.message = Some("amount must be at least 1".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MpesaPaymentResponse {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    /// "0" when accepted for processing, non-zero when declined
    pub response_code: String,
    pub response_message: String,
    pub customer_message: String,
}

impl MpesaPaymentResponse {
    pub fn is_accepted(&self) -> bool {
        self.response_code == crate::config::MPESA_RESPONSE_ACCEPTED
    }
}

/// Gateway webhook body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MpesaCallback {
    #[serde(default)]
    pub merchant_request_id: String,
    #[validate(length(min = 1, message = "checkout_request_id is required"))]
    pub checkout_request_id: String,
    pub result_code: i32,
    #[serde(default)]
    pub result_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_metadata: Option<CallbackMetadata>,
}

impl MpesaCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Look up a metadata item by name, e.g. `MpesaReceiptNumber`.
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.callback_metadata
            .as_ref()?
            .item
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallbackMetadata {
    pub item: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallbackItem {
    pub name: String,
    pub value: String,
}

/// Outbound STK push payload. Built for every initiation; the simulator never sends it.
#[derive(Debug, Clone, Serialize)]
pub struct StkPushRequest {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    pub call_back_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}
