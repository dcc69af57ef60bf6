//! STK push initiation and callback reconciliation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use duka::domain::{
    CreateOrder, MpesaCallback, MpesaPaymentRequest, OrderResponse, OrderStatus, PaymentStatus,
    UserRole,
};
use duka::errors::AppError;
use duka::infra::{PaymentGateway, Persistence, UnitOfWork};
use duka::services::{Checkout, OrderService, PaymentReconciler, PaymentService};

use common::{
    create_product, create_user, fill_cart, persistence, test_config, FixedGateway,
    ManualScheduler, MemoryCache,
};

struct Fixture {
    uow: Arc<Persistence>,
    scheduler: Arc<ManualScheduler>,
    payments: PaymentReconciler<Persistence>,
    orders: Checkout<Persistence>,
    user_id: i32,
    order: OrderResponse,
}

async fn fixture(gateway: Arc<dyn PaymentGateway>) -> Fixture {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "payer@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Speaker", 2500, 5).await;
    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 1).await;

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let order = orders
        .create_order(
            user.id,
            CreateOrder {
                cart_id,
                shipping_address: "Kenyatta Avenue 1".into(),
            },
        )
        .await
        .unwrap();

    let scheduler = ManualScheduler::new();
    let payments = PaymentReconciler::new(
        uow.clone(),
        gateway,
        scheduler.clone(),
        test_config().mpesa,
    );

    Fixture {
        uow,
        scheduler,
        payments,
        orders,
        user_id: user.id,
        order,
    }
}

fn stk_request(order_id: i32) -> MpesaPaymentRequest {
    MpesaPaymentRequest {
        order_id,
        phone_number: "254712345678".into(),
        amount: Decimal::new(2500, 2),
    }
}

fn callback(checkout_request_id: &str, result_code: i32) -> MpesaCallback {
    MpesaCallback {
        merchant_request_id: "mr_test".into(),
        checkout_request_id: checkout_request_id.into(),
        result_code,
        result_desc: if result_code == 0 {
            "The service request is processed successfully".into()
        } else {
            "Request cancelled by user".into()
        },
        callback_metadata: None,
    }
}

async fn payment_status(fx: &Fixture, checkout_request_id: &str) -> PaymentStatus {
    fx.uow
        .payments()
        .find_by_transaction_id(checkout_request_id)
        .await
        .unwrap()
        .unwrap()
        .status
}

async fn order_status(fx: &Fixture) -> OrderStatus {
    fx.orders
        .get_order(fx.order.id, fx.user_id)
        .await
        .unwrap()
        .status
}

#[tokio::test]
async fn test_accepted_push_records_pending_payment_and_schedules_completion() {
    let gateway = FixedGateway::accepting();
    let fx = fixture(gateway.clone()).await;

    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();

    assert_eq!(response.response_code, "0");
    assert_eq!(payment_status(&fx, &response.checkout_request_id).await, PaymentStatus::Pending);
    assert_eq!(fx.scheduler.keys(), vec![response.checkout_request_id.clone()]);
    assert_eq!(fx.scheduler.delays(), vec![Duration::from_millis(10)]);

    let sent = gateway.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.account_reference, format!("Order #{}", fx.order.id));
    assert_eq!(sent.phone_number, "254712345678");
}

#[tokio::test]
async fn test_scheduled_completion_confirms_order() {
    let fx = fixture(FixedGateway::accepting()).await;
    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();

    assert_eq!(fx.scheduler.run_all().await, 1);

    assert_eq!(payment_status(&fx, &response.checkout_request_id).await, PaymentStatus::Success);
    let order = fx.orders.get_order(fx.order.id, fx.user_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    let payment = order.payment.unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);
    assert!(payment.paid_at.is_some());
}

#[tokio::test]
async fn test_declined_push_marks_payment_failed() {
    let fx = fixture(FixedGateway::declining()).await;

    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();

    assert_eq!(response.response_code, "1");
    assert_eq!(response.response_message, "Insufficient balance");
    assert_eq!(payment_status(&fx, &response.checkout_request_id).await, PaymentStatus::Failed);
    assert!(fx.scheduler.keys().is_empty());
    assert_eq!(order_status(&fx).await, OrderStatus::Pending);
}

#[tokio::test]
async fn test_failure_callback_leaves_order_pending() {
    let fx = fixture(FixedGateway::accepting()).await;
    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();

    fx.payments
        .process_callback(callback(&response.checkout_request_id, 1032))
        .await
        .unwrap();

    assert_eq!(payment_status(&fx, &response.checkout_request_id).await, PaymentStatus::Failed);
    assert_eq!(order_status(&fx).await, OrderStatus::Pending);

    // A failed attempt does not block a retry.
    let retry = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();
    assert_ne!(retry.checkout_request_id, response.checkout_request_id);
}

#[tokio::test]
async fn test_paid_order_cannot_be_charged_again() {
    let fx = fixture(FixedGateway::accepting()).await;
    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();
    fx.payments
        .process_callback(callback(&response.checkout_request_id, 0))
        .await
        .unwrap();

    let err = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "order is already paid"));
}

#[tokio::test]
async fn test_callbacks_are_idempotent() {
    let fx = fixture(FixedGateway::accepting()).await;
    let response = fx
        .payments
        .initiate_stk_push(fx.user_id, stk_request(fx.order.id))
        .await
        .unwrap();
    let id = response.checkout_request_id.as_str();

    fx.payments.process_callback(callback(id, 0)).await.unwrap();
    let first_paid_at = fx
        .uow
        .payments()
        .find_by_transaction_id(id)
        .await
        .unwrap()
        .unwrap()
        .paid_at;

    fx.payments.process_callback(callback(id, 0)).await.unwrap();
    fx.payments.process_callback(callback(id, 1)).await.unwrap();

    let payment = fx
        .uow
        .payments()
        .find_by_transaction_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);
    assert_eq!(payment.paid_at, first_paid_at);
    assert_eq!(order_status(&fx).await, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_callback_for_unknown_checkout_is_not_found() {
    let fx = fixture(FixedGateway::accepting()).await;

    let err = fx
        .payments
        .process_callback(callback("ws_CO_missing", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Payment"));
}

#[tokio::test]
async fn test_cannot_pay_for_someone_elses_order() {
    let fx = fixture(FixedGateway::accepting()).await;
    let stranger = create_user(fx.uow.as_ref(), "stranger@example.com", UserRole::Customer).await;

    let err = fx
        .payments
        .initiate_stk_push(stranger.id, stk_request(fx.order.id))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref e) if e == "Order"));
    assert!(fx.scheduler.keys().is_empty());
}
