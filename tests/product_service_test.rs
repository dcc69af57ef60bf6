//! Catalog search, caching and delete rules.

mod common;

use std::sync::atomic::Ordering;

use rust_decimal::Decimal;
use uuid::Uuid;

use duka::domain::{CreateOrder, Money, ProductInput, ProductQuery, UserRole};
use duka::errors::AppError;
use duka::infra::UnitOfWork;
use duka::services::{Catalog, Checkout, OrderService, ProductService};

use common::{create_product, create_user, fill_cart, persistence, MemoryCache};

fn input(name: &str, cents: i64, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: String::new(),
        price: Money::from_cents(cents),
        stock,
        image_url: String::new(),
    }
}

#[tokio::test]
async fn test_search_filters_and_paginates() {
    let uow = persistence().await;
    create_product(uow.as_ref(), "Phone Case", 1500, 10).await;
    create_product(uow.as_ref(), "Phone Charger", 2500, 0).await;
    create_product(uow.as_ref(), "Smart Phone", 50000, 4).await;
    create_product(uow.as_ref(), "Desk", 12000, 2).await;
    let catalog = Catalog::new(uow, MemoryCache::new(), 60);

    let page = catalog
        .search(ProductQuery {
            name: Some("phone".into()),
            in_stock: Some(true),
            max_price: Some(Decimal::new(30000, 2)),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Phone Case"]);
    assert_eq!(page.meta.total, 1);

    let page = catalog
        .search(ProductQuery {
            sort_by: Some("price".into()),
            sort_order: Some("asc".into()),
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.meta.total, 4);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Smart Phone");
}

#[tokio::test]
async fn test_find_reads_through_cache() {
    let uow = persistence().await;
    let product = create_product(uow.as_ref(), "Keyboard", 7000, 5).await;
    let cache = MemoryCache::new();
    let catalog = Catalog::new(uow, cache.clone(), 60);

    assert!(cache.cached(product.product_id).is_none());
    let found = catalog.find_by_id(product.product_id).await.unwrap();
    assert_eq!(found, product);
    assert_eq!(cache.cached(product.product_id), Some(product.clone()));

    catalog
        .update(product.product_id, input("Keyboard Pro", 8000, 5))
        .await
        .unwrap();
    assert!(cache.cached(product.product_id).is_none());

    let refreshed = catalog.find_by_id(product.product_id).await.unwrap();
    assert_eq!(refreshed.name, "Keyboard Pro");
    assert_eq!(cache.product_reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_database() {
    let uow = persistence().await;
    let product = create_product(uow.as_ref(), "Mouse", 2000, 5).await;
    let catalog = Catalog::new(uow, MemoryCache::down(), 60);

    let found = catalog.find_by_id(product.product_id).await.unwrap();
    assert_eq!(found.product_id, product.product_id);

    catalog.delete(product.product_id).await.unwrap();
    let err = catalog.find_by_id(product.product_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref e) if e == "Product"));
}

#[tokio::test]
async fn test_ordered_product_cannot_be_deleted() {
    let uow = persistence().await;
    let user = create_user(uow.as_ref(), "buyer@example.com", UserRole::Customer).await;
    let sold = create_product(uow.as_ref(), "Sold", 1000, 5).await;
    let carted = create_product(uow.as_ref(), "Carted", 1000, 5).await;

    let cart_id = fill_cart(uow.clone(), user.id, sold.product_id, 1).await;
    Checkout::new(uow.clone(), MemoryCache::new())
        .create_order(
            user.id,
            CreateOrder {
                cart_id,
                shipping_address: "Ngong Road".into(),
            },
        )
        .await
        .unwrap();
    fill_cart(uow.clone(), user.id, carted.product_id, 1).await;

    let catalog = Catalog::new(uow.clone(), MemoryCache::new(), 60);

    let err = catalog.delete(sold.product_id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(uow.products().find_by_product_id(sold.product_id).await.unwrap().is_some());

    // Cart lines go with the product.
    catalog.delete(carted.product_id).await.unwrap();
    let cart = uow.carts().get_by_user(user.id).await.unwrap();
    assert!(uow.carts().lines(cart.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_missing_product() {
    let uow = persistence().await;
    let catalog = Catalog::new(uow, MemoryCache::new(), 60);
    let missing = Uuid::new_v4();

    let err = catalog.update(missing, input("Nothing", 1, 1)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = catalog.delete(missing).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
