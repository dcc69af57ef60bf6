//! M-Pesa handlers: STK push initiation and the gateway webhook.

use axum::{extract::State, routing::post, Extension, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{MpesaCallback, MpesaPaymentRequest, MpesaPaymentResponse};
use crate::errors::AppResult;
use crate::types::ApiResponse;

pub fn mpesa_routes() -> Router<AppState> {
    Router::new().route("/v1/api/mpesa/stkpush", post(initiate_stk_push))
}

/// Unauthenticated; the gateway calls it.
pub fn mpesa_webhook_routes() -> Router<AppState> {
    Router::new().route("/v1/api/mpesa/callback", post(process_callback))
}

/// Start an M-Pesa payment for an order
#[utoipa::path(
    post,
    path = "/v1/api/mpesa/stkpush",
    tag = "M-Pesa",
    request_body = MpesaPaymentRequest,
    responses(
        (status = 200, description = "STK push initiated; check response_code", body = MpesaPaymentResponse),
        (status = 400, description = "Invalid request or order already paid"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn initiate_stk_push(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<MpesaPaymentRequest>,
) -> AppResult<ApiResponse<MpesaPaymentResponse>> {
    let response = state
        .payment_service
        .initiate_stk_push(user.id, payload)
        .await?;
    Ok(ApiResponse::with_message(response, "STK push initiated successfully"))
}

/// Payment result webhook
#[utoipa::path(
    post,
    path = "/v1/api/mpesa/callback",
    tag = "M-Pesa",
    request_body = MpesaCallback,
    responses(
        (status = 200, description = "Callback processed"),
        (status = 404, description = "Unknown checkout request id")
    )
)]
pub async fn process_callback(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MpesaCallback>,
) -> AppResult<ApiResponse<()>> {
    state.payment_service.process_callback(payload).await?;
    Ok(ApiResponse::message("Callback processed successfully"))
}
