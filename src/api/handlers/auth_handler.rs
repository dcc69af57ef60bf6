//! Registration and login handlers.

use axum::{extract::State, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Credentials, RegisterUser, UserResponse};
use crate::errors::AppResult;
use crate::services::LoginResponse;
use crate::types::ApiResponse;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/api/users", post(register))
        .route("/v1/api/authentication", post(authenticate))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/v1/api/users",
    tag = "Authentication",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.auth_service.register(payload).await?;
    Ok(ApiResponse::created(UserResponse::from(user)))
}

/// Exchange credentials for a JWT
#[utoipa::path(
    post,
    path = "/v1/api/authentication",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Credentials>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let login = state.auth_service.login(payload).await?;
    Ok(ApiResponse::ok(login))
}
