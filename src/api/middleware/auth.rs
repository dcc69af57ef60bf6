//! JWT authentication and role gating.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::UserRole;
use crate::errors::AppError;

/// Authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: String,
}

/// Validate the bearer token and attach the [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .auth_service
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Exact role match; admins do not satisfy a customer requirement.
pub fn require_role(user: &CurrentUser, role: UserRole) -> Result<(), AppError> {
    if user.role == role.as_str() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

async fn role_guard(role: UserRole, request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if let Err(e) = require_role(user, role) {
        tracing::debug!(user_id = user.id, role = %user.role, required = %role, "Role check failed");
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Route layer: caller must be a customer. Runs after [`auth_middleware`].
pub async fn require_customer(request: Request, next: Next) -> Result<Response, AppError> {
    role_guard(UserRole::Customer, request, next).await
}

/// Route layer: caller must be an admin. Runs after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    role_guard(UserRole::Admin, request, next).await
}
