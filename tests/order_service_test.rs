//! Checkout and order lifecycle against a real schema.

mod common;

use std::sync::Arc;

use duka::domain::{CreateOrder, Money, OrderStatus, UserRole};
use duka::errors::AppError;
use duka::infra::{Persistence, UnitOfWork};
use duka::services::{CartService, CartManager, Catalog, Checkout, OrderService, ProductService};
use tokio_test::{assert_err, assert_ok};

use common::{create_product, create_user, fill_cart, persistence, MemoryCache};

fn checkout_request(cart_id: i32) -> CreateOrder {
    CreateOrder {
        cart_id,
        shipping_address: "Moi Avenue 12, Nairobi".to_string(),
    }
}

async fn stock_of(uow: &Persistence, product_id: uuid::Uuid) -> i32 {
    uow.products()
        .get_by_product_id(product_id)
        .await
        .unwrap()
        .stock
}

#[tokio::test]
async fn test_checkout_totals_decrements_stock_and_empties_cart() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "buyer@example.com", UserRole::Customer).await;
    let a = create_product(uow.as_ref(), "Cable", 1000, 5).await;
    let b = create_product(uow.as_ref(), "Adapter", 500, 3).await;

    let cart_id = fill_cart(uow.clone(), user.id, a.product_id, 2).await;
    fill_cart(uow.clone(), user.id, b.product_id, 1).await;

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let order = orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap();

    assert_eq!(order.total, Money::from_cents(2500));
    assert_eq!(order.total.to_string(), "25.00");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.order_items.len(), 2);
    assert!(order.payment.is_none());

    assert_eq!(stock_of(&uow, a.product_id).await, 3);
    assert_eq!(stock_of(&uow, b.product_id).await, 2);

    let cart = CartManager::new(uow.clone()).get_cart(user.id).await.unwrap();
    assert_eq!(cart.id, cart_id);
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_order_items_keep_price_snapshot() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "snap@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Lamp", 1999, 4).await;
    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 1).await;

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let order = orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap();

    uow.products()
        .update(
            product.product_id,
            duka::domain::ProductInput {
                name: "Lamp".into(),
                description: String::new(),
                price: Money::from_cents(2999),
                stock: 3,
                image_url: String::new(),
            },
        )
        .await
        .unwrap();

    let reloaded = orders.get_order(order.id, user.id).await.unwrap();
    assert_eq!(reloaded.order_items[0].price, Money::from_cents(1999));
    assert_eq!(reloaded.total, Money::from_cents(1999));
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back_everything() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "short@example.com", UserRole::Customer).await;
    let plenty = create_product(uow.as_ref(), "Plenty", 100, 10).await;
    let scarce = create_product(uow.as_ref(), "Scarce", 100, 2).await;

    let cart_id = fill_cart(uow.clone(), user.id, plenty.product_id, 3).await;
    fill_cart(uow.clone(), user.id, scarce.product_id, 2).await;

    // Another buyer takes one unit between add-to-cart and checkout.
    assert!(uow.products().decrement_stock(scarce.product_id, 1).await.unwrap());

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let err = orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { ref product } if product == "Scarce"));
    assert_eq!(stock_of(&uow, plenty.product_id).await, 10);
    assert_eq!(stock_of(&uow, scarce.product_id).await, 1);
    assert!(orders.list_orders(user.id).await.unwrap().is_empty());

    let cart = CartManager::new(uow.clone()).get_cart(user.id).await.unwrap();
    assert_eq!(cart.items.len(), 2);
}

#[tokio::test]
async fn test_stock_decrement_refuses_to_go_negative() {
    let uow = persistence().await;
    let product = create_product(uow.as_ref(), "Single", 700, 1).await;
    let products = uow.products();

    assert!(!assert_ok!(products.decrement_stock(product.product_id, 2).await));
    assert_eq!(stock_of(&uow, product.product_id).await, 1);

    assert!(assert_ok!(products.decrement_stock(product.product_id, 1).await));
    assert!(!assert_ok!(products.decrement_stock(product.product_id, 1).await));
    assert_eq!(stock_of(&uow, product.product_id).await, 0);
}

#[tokio::test]
async fn test_checkout_stops_at_stock_sold_after_add_to_cart() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "late@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Console", 45000, 2).await;
    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 2).await;

    assert!(assert_ok!(uow.products().decrement_stock(product.product_id, 2).await));

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let err = assert_err!(orders.create_order(user.id, checkout_request(cart_id)).await);

    assert!(matches!(err, AppError::InsufficientStock { ref product } if product == "Console"));
    assert_eq!(stock_of(&uow, product.product_id).await, 0);
    assert!(assert_ok!(orders.list_orders(user.id).await).is_empty());
}

#[tokio::test]
async fn test_checkout_evicts_cached_products() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "cached@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Speaker", 3500, 6).await;
    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 4).await;

    let cache = MemoryCache::new();
    let catalog = Catalog::new(uow.clone(), cache.clone(), 60);
    assert_ok!(catalog.find_by_id(product.product_id).await);
    assert_eq!(cache.cached(product.product_id).map(|p| p.stock), Some(6));

    assert_ok!(
        Checkout::new(uow.clone(), cache.clone())
            .create_order(user.id, checkout_request(cart_id))
            .await
    );

    assert!(cache.cached(product.product_id).is_none());
    let fresh = assert_ok!(catalog.find_by_id(product.product_id).await);
    assert_eq!(fresh.stock, 2);
}

#[tokio::test]
async fn test_concurrent_checkouts_sell_last_unit_once() {
    let uow = persistence().await;
    let first = create_user(uow.as_ref(), "first@example.com", UserRole::Customer).await;
    let second = create_user(uow.as_ref(), "second@example.com", UserRole::Customer).await;
    let last = create_product(uow.as_ref(), "Last One", 5000, 1).await;

    let first_cart = fill_cart(uow.clone(), first.id, last.product_id, 1).await;
    let second_cart = fill_cart(uow.clone(), second.id, last.product_id, 1).await;

    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    let (a, b) = tokio::join!(
        orders.create_order(first.id, checkout_request(first_cart)),
        orders.create_order(second.id, checkout_request(second_cart)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(failure, AppError::InsufficientStock { .. }));
    assert_eq!(stock_of(&uow, last.product_id).await, 0);
}

#[tokio::test]
async fn test_cart_is_reused_after_checkout() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "again@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Mug", 800, 10).await;

    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 1).await;
    let orders = Checkout::new(uow.clone(), MemoryCache::new());
    orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap();

    let next_cart_id = fill_cart(uow.clone(), user.id, product.product_id, 2).await;
    assert_eq!(next_cart_id, cart_id);

    let second = orders
        .create_order(user.id, checkout_request(next_cart_id))
        .await
        .unwrap();
    assert_eq!(second.total, Money::from_cents(1600));
}

#[tokio::test]
async fn test_empty_or_foreign_cart_is_rejected() {
    let uow = persistence().await;
    let owner = create_user(uow.as_ref(), "owner@example.com", UserRole::Customer).await;
    let other = create_user(uow.as_ref(), "other@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Pen", 100, 10).await;
    let orders = Checkout::new(uow.clone(), MemoryCache::new());

    let err = orders
        .create_order(owner.id, checkout_request(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Cart"));

    let owner_cart = fill_cart(uow.clone(), owner.id, product.product_id, 1).await;
    let other_cart = fill_cart(uow.clone(), other.id, product.product_id, 1).await;

    let err = orders
        .create_order(other.id, checkout_request(owner_cart))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Cart"));

    CartManager::new(uow.clone()).clear_cart(other.id).await.unwrap();
    let err = orders
        .create_order(other.id, checkout_request(other_cart))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "cart is empty"));
}

#[tokio::test]
async fn test_orders_are_private_and_newest_first() {
    let uow = persistence().await;
    let owner = create_user(uow.as_ref(), "mine@example.com", UserRole::Customer).await;
    let stranger = create_user(uow.as_ref(), "theirs@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Book", 1200, 10).await;
    let orders = Checkout::new(uow.clone(), MemoryCache::new());

    let mut placed = Vec::new();
    for _ in 0..3 {
        let cart_id = fill_cart(uow.clone(), owner.id, product.product_id, 1).await;
        placed.push(
            orders
                .create_order(owner.id, checkout_request(cart_id))
                .await
                .unwrap()
                .id,
        );
    }

    let listed: Vec<i32> = orders
        .list_orders(owner.id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    placed.reverse();
    assert_eq!(listed, placed);

    assert!(orders.list_orders(stranger.id).await.unwrap().is_empty());
    let err = orders.get_order(placed[0], stranger.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Order"));
}

#[tokio::test]
async fn test_cancel_only_before_shipping() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "cancel@example.com", UserRole::Customer).await;
    let product = create_product(uow.as_ref(), "Chair", 4500, 10).await;
    let orders = Checkout::new(uow.clone(), MemoryCache::new());

    let cart_id = fill_cart(uow.clone(), user.id, product.product_id, 1).await;
    let pending = orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap();
    let cancelled = orders.cancel_order(pending.id, user.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    fill_cart(uow.clone(), user.id, product.product_id, 1).await;
    let shipped = orders
        .create_order(user.id, checkout_request(cart_id))
        .await
        .unwrap();
    orders
        .update_status(shipped.id, OrderStatus::Shipped)
        .await
        .unwrap();

    let err = orders.cancel_order(shipped.id, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(
        orders.get_order(shipped.id, user.id).await.unwrap().status,
        OrderStatus::Shipped
    );
}

#[tokio::test]
async fn test_admin_status_update_on_missing_order() {
    let uow: Arc<Persistence> = persistence().await;
    let err = Checkout::new(uow, MemoryCache::new())
        .update_status(404, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Order"));
}
