//! SeaORM adapter for the users table.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::users;

pub mod dto;

pub use dto::{UserCreate, UserUpdate};

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let user_active = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(dto.username),
        email: Set(dto.email),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user_active.insert(conn).await
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id).one(conn).await
}

pub async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await
}

pub async fn list_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .order_by_asc(users::Column::CreatedAt)
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await
}

/// Apply `dto` to the user. Returns `Ok(None)` when the row does not exist.
pub async fn update_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: Uuid,
    dto: UserUpdate,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    let Some(existing) = users::Entity::find_by_id(user_id).one(conn).await? else {
        return Ok(None);
    };

    let mut active = existing.into_active_model();
    if let Some(username) = dto.username {
        active.username = Set(username);
    }
    if let Some(email) = dto.email {
        active.email = Set(email);
    }
    active.updated_at = Set(time::OffsetDateTime::now_utc());

    active.update(conn).await.map(Some)
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: Uuid,
) -> Result<u64, sea_orm::DbErr> {
    let res = users::Entity::delete_by_id(user_id).exec(conn).await?;
    Ok(res.rows_affected)
}
