//! Demo data endpoints. Admin only.

use axum::{extract::State, routing::post, Router};

use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::SeedReport;
use crate::types::ApiResponse;

pub fn seed_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/seed/users", post(seed_users))
        .route("/v1/api/seed/products", post(seed_products))
        .route("/v1/api/seed/all", post(seed_all))
}

/// Insert the demo accounts
#[utoipa::path(
    post,
    path = "/v1/api/seed/users",
    tag = "Seed",
    responses((status = 200, description = "Users seeded", body = SeedReport)),
    security(("bearer_auth" = []))
)]
pub async fn seed_users(State(state): State<AppState>) -> AppResult<ApiResponse<SeedReport>> {
    let report = state.seed_service.seed_users().await?;
    Ok(ApiResponse::with_message(report, "Users seeded successfully"))
}

/// Insert the demo catalog
#[utoipa::path(
    post,
    path = "/v1/api/seed/products",
    tag = "Seed",
    responses((status = 200, description = "Products seeded", body = SeedReport)),
    security(("bearer_auth" = []))
)]
pub async fn seed_products(State(state): State<AppState>) -> AppResult<ApiResponse<SeedReport>> {
    let report = state.seed_service.seed_products().await?;
    Ok(ApiResponse::with_message(report, "Products seeded successfully"))
}

/// Insert accounts and catalog
#[utoipa::path(
    post,
    path = "/v1/api/seed/all",
    tag = "Seed",
    responses((status = 200, description = "All data seeded", body = SeedReport)),
    security(("bearer_auth" = []))
)]
pub async fn seed_all(State(state): State<AppState>) -> AppResult<ApiResponse<SeedReport>> {
    let report = state.seed_service.seed_all().await?;
    Ok(ApiResponse::with_message(report, "All data seeded successfully"))
}
