//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{ROLE_ADMIN, ROLE_CUSTOMER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Customer => ROLE_CUSTOMER,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Customer,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "customer123", min_length = 6)]
    pub password: String,
    /// User display name
    #[validate(length(min = 1, max = 150, message = "Name must be 1 to 150 characters"))]
    #[schema(example = "John Doe")]
    pub name: String,
    /// Account role
    #[schema(example = "customer")]
    pub role: UserRole,
}

/// Login payload; `username` carries the account email
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct Credentials {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "customer123")]
    pub password: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "customer")]
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_strings() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("customer"), UserRole::Customer);
        assert_eq!(UserRole::from("unknown"), UserRole::Customer);
        assert_eq!(String::from(UserRole::Admin), "admin");
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let parsed = serde_json::from_value::<RegisterUser>(serde_json::json!({
            "email": "a@b.co",
            "password": "secret1",
            "name": "A",
            "role": "superuser"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_register_validation() {
        let input = RegisterUser {
            email: "not-an-email".into(),
            password: "123".into(),
            name: "x".repeat(151),
            role: UserRole::Customer,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }
}
