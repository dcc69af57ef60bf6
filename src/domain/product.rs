//! Catalog product entity, inputs and search parameters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::Money;
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    /// Stable external identifier
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}

/// Create / update payload for catalog management
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "iPhone 15 Pro")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Latest iPhone with A17 Pro chip")]
    pub description: String,
    #[validate(custom(function = "non_negative_price"))]
    #[schema(value_type = String, example = "999.99")]
    pub price: Money,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[schema(example = 50)]
    pub stock: i32,
    #[serde(default)]
    #[schema(example = "https://example.com/iphone15pro.jpg")]
    pub image_url: String,
}

fn non_negative_price(price: &Money) -> Result<(), ValidationError> {
    if price.is_negative() {
        let mut error = ValidationError::new("range");
        error.message = Some("Price cannot be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Product as returned by the API; `id` is the external identifier
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    #[schema(example = "iPhone 15 Pro")]
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "999.99")]
    pub price: Money,
    #[schema(example = 50)]
    pub stock: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.product_id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image_url,
            created_at: product.created_at,
        }
    }
}

/// Columns the catalog may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Catalog search query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Substring match on product name
    pub name: Option<String>,
    /// Lower price bound; ignored when zero or negative
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Upper price bound; ignored when zero or negative
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Only products with stock > 0
    pub in_stock: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// One of `name`, `price`, `created_at`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
}

impl ProductQuery {
    pub fn page(&self) -> u64 {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE_NUMBER)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    /// Name filter, if non-blank
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn min_price(&self) -> Option<Money> {
        positive_money(self.min_price)
    }

    pub fn max_price(&self) -> Option<Money> {
        positive_money(self.max_price)
    }

    /// Resolve sorting against the allow-list; unknown columns fall back to creation time.
    pub fn sort(&self) -> (SortField, SortDirection) {
        let field = match self.sort_by.as_deref() {
            Some("name") => SortField::Name,
            Some("price") => SortField::Price,
            _ => SortField::CreatedAt,
        };
        let direction = match self.sort_order.as_deref() {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        (field, direction)
    }
}

fn positive_money(amount: Option<Decimal>) -> Option<Money> {
    amount
        .filter(|a| a.is_sign_positive() && !a.is_zero())
        .and_then(|a| Money::from_decimal(a).ok())
}
