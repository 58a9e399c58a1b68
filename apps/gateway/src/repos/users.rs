//! User repository: domain model, capability trait and SeaORM implementation.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::users_sea::{self as users_adapter, UserCreate, UserUpdate};
use crate::errors::domain::DomainError;

/// User domain model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, dto: UserCreate) -> Result<User, DomainError>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
    /// `Ok(None)` when the user does not exist.
    async fn update_user(&self, user_id: Uuid, dto: UserUpdate)
        -> Result<Option<User>, DomainError>;
    /// `Ok(false)` when the user does not exist.
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, DomainError>;
}

/// `UserRepo` over a pool or a transaction.
pub struct UserRepoSea<'c, C> {
    conn: &'c C,
}

impl<'c, C> UserRepoSea<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c, C: ConnectionTrait + Send + Sync> UserRepo for UserRepoSea<'c, C> {
    async fn create_user(&self, dto: UserCreate) -> Result<User, DomainError> {
        let user = users_adapter::create_user(self.conn, dto)
            .await
            .map_err(|e| DomainError::from(e).with_context("create user"))?;
        Ok(User::from(user))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, DomainError> {
        let user = users_adapter::find_user_by_id(self.conn, user_id)
            .await
            .map_err(|e| DomainError::from(e).with_context("get user"))?;
        Ok(user.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let user = users_adapter::find_user_by_email(self.conn, email)
            .await
            .map_err(|e| DomainError::from(e).with_context("get user by email"))?;
        Ok(user.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = users_adapter::list_users(self.conn)
            .await
            .map_err(|e| DomainError::from(e).with_context("list users"))?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        dto: UserUpdate,
    ) -> Result<Option<User>, DomainError> {
        let user = users_adapter::update_user(self.conn, user_id, dto)
            .await
            .map_err(|e| DomainError::from(e).with_context("update user"))?;
        Ok(user.map(User::from))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, DomainError> {
        let removed = users_adapter::delete_user(self.conn, user_id)
            .await
            .map_err(|e| DomainError::from(e).with_context("delete user"))?;
        Ok(removed > 0)
    }
}

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
