//! Authentication service - registration, login and token verification.
//!
//! Password hashing lives in the domain `Password` value object; this service
//! only orchestrates it against the user store and signs tokens.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::Config;
use crate::domain::{Credentials, Password, RegisterUser, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Hash verified when the email is unknown, so both paths cost the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$ZHVtbXloYXNoMTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMg";

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returned after successful authentication
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "customer")]
    pub role: UserRole,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account; duplicate email is a conflict.
    async fn register(&self, input: RegisterUser) -> AppResult<User>;

    /// Verify credentials and issue a signed token.
    async fn login(&self, credentials: Credentials) -> AppResult<LoginResponse>;

    /// Verify a token and extract its claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(token)
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterUser) -> AppResult<User> {
        if self.uow.users().find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(input.email, password_hash, input.name, input.role)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, credentials: Credentials) -> AppResult<LoginResponse> {
        let user = self.uow.users().find_by_email(&credentials.username).await?;

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(hash).verify(&credentials.password);

        let user = match user {
            Some(user) if password_valid && user.is_active => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = generate_token(&user, &self.config)?;
        Ok(LoginResponse {
            token,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
