//! User store.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{User, UserRole};
use crate::errors::{AppResult, OptionExt};

/// User data access over any SeaORM connection or transaction.
pub struct UserStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.conn).await?;
        Ok(result.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await?;

        Ok(result.map(User::from))
    }

    pub async fn create(
        &self,
        email: String,
        password_hash: String,
        name: String,
        role: UserRole,
    ) -> AppResult<User> {
        let model = ActiveModel {
            id: NotSet,
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            role: Set(role.to_string()),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(self.conn)
        .await?;

        Ok(User::from(model))
    }

    /// Deactivated accounts keep their data but can no longer log in.
    pub async fn set_active(&self, id: i32, is_active: bool) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = existing.into();
        active.is_active = Set(is_active);

        let model = active.update(self.conn).await?;
        Ok(User::from(model))
    }
}
