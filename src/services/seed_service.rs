//! Demo data: three accounts and a small electronics catalog.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::{Money, Password, ProductInput, UserRole};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SEED_USERS: &[(&str, &str, &str, UserRole)] = &[
    ("Administrator", "admin@example.com", "admin123", UserRole::Admin),
    ("John Doe", "john@example.com", "customer123", UserRole::Customer),
    ("Jane Smith", "jane@example.com", "customer123", UserRole::Customer),
];

/// name, description, price in cents, stock, image
const SEED_PRODUCTS: &[(&str, &str, i64, i32, &str)] = &[
    ("iPhone 15 Pro", "Latest iPhone with advanced camera system and titanium design", 99_999, 50, "https://example.com/iphone15pro.jpg"),
    ("Samsung Galaxy S24", "Premium Android smartphone with AI features", 89_999, 30, "https://example.com/galaxy-s24.jpg"),
    ("MacBook Pro 16-inch", "Professional laptop with M3 chip and stunning display", 249_999, 20, "https://example.com/macbook-pro.jpg"),
    ("Dell XPS 13", "Ultra-portable laptop with InfinityEdge display", 129_999, 25, "https://example.com/dell-xps13.jpg"),
    ("Sony WH-1000XM5", "Industry-leading noise canceling wireless headphones", 39_999, 100, "https://example.com/sony-wh1000xm5.jpg"),
    ("iPad Air", "Versatile tablet with M1 chip and all-screen design", 59_999, 40, "https://example.com/ipad-air.jpg"),
    ("Nintendo Switch OLED", "Gaming console with vibrant OLED screen", 34_999, 60, "https://example.com/switch-oled.jpg"),
    ("Apple Watch Series 9", "Advanced smartwatch with health monitoring features", 39_999, 80, "https://example.com/apple-watch9.jpg"),
];

/// Rows inserted by a seeding run; existing rows are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeedReport {
    pub users_created: usize,
    pub products_created: usize,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SeedService: Send + Sync {
    async fn seed_users(&self) -> AppResult<SeedReport>;

    async fn seed_products(&self) -> AppResult<SeedReport>;

    async fn seed_all(&self) -> AppResult<SeedReport>;
}

pub struct Seeder<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Seeder<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> SeedService for Seeder<U> {
    async fn seed_users(&self) -> AppResult<SeedReport> {
        let users = self.uow.users();
        let mut created = 0;

        for (name, email, password, role) in SEED_USERS {
            if users.find_by_email(email).await?.is_some() {
                continue;
            }
            let hash = Password::new(password)?.into_string();
            users
                .create(email.to_string(), hash, name.to_string(), *role)
                .await?;
            created += 1;
        }

        tracing::info!(created, "Users seeded");
        Ok(SeedReport {
            users_created: created,
            ..Default::default()
        })
    }

    async fn seed_products(&self) -> AppResult<SeedReport> {
        let products = self.uow.products();
        let mut created = 0;

        for (name, description, cents, stock, image_url) in SEED_PRODUCTS {
            if products.find_by_name(name).await?.is_some() {
                continue;
            }
            products
                .create(ProductInput {
                    name: name.to_string(),
                    description: description.to_string(),
                    price: Money::from_cents(*cents),
                    stock: *stock,
                    image_url: image_url.to_string(),
                })
                .await?;
            created += 1;
        }

        tracing::info!(created, "Products seeded");
        Ok(SeedReport {
            products_created: created,
            ..Default::default()
        })
    }

    async fn seed_all(&self) -> AppResult<SeedReport> {
        let users = self.seed_users().await?;
        let products = self.seed_products().await?;

        Ok(SeedReport {
            users_created: users.users_created,
            products_created: products.products_created,
        })
    }
}
