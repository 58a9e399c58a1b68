//! SeaORM adapter for the articles table.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::articles;

pub mod dto;

pub use dto::{ArticleCreate, ArticleUpdate};

pub async fn create_article<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ArticleCreate,
) -> Result<articles::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let article_active = articles::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(dto.title),
        content: Set(dto.content),
        author_id: Set(dto.author_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    article_active.insert(conn).await
}

pub async fn find_article_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    article_id: Uuid,
) -> Result<Option<articles::Model>, sea_orm::DbErr> {
    articles::Entity::find_by_id(article_id).one(conn).await
}

pub async fn list_articles<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<articles::Model>, sea_orm::DbErr> {
    articles::Entity::find()
        .order_by_asc(articles::Column::CreatedAt)
        .order_by_asc(articles::Column::Id)
        .all(conn)
        .await
}

pub async fn list_articles_by_author<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    author_id: Uuid,
) -> Result<Vec<articles::Model>, sea_orm::DbErr> {
    articles::Entity::find()
        .filter(articles::Column::AuthorId.eq(author_id))
        .order_by_asc(articles::Column::CreatedAt)
        .order_by_asc(articles::Column::Id)
        .all(conn)
        .await
}

/// Apply `dto` to the article. Returns `Ok(None)` when the row does not exist.
pub async fn update_article<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    article_id: Uuid,
    dto: ArticleUpdate,
) -> Result<Option<articles::Model>, sea_orm::DbErr> {
    let Some(existing) = articles::Entity::find_by_id(article_id).one(conn).await? else {
        return Ok(None);
    };

    let mut active = existing.into_active_model();
    if let Some(title) = dto.title {
        active.title = Set(title);
    }
    if let Some(content) = dto.content {
        active.content = Set(content);
    }
    active.updated_at = Set(time::OffsetDateTime::now_utc());

    active.update(conn).await.map(Some)
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete_article<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    article_id: Uuid,
) -> Result<u64, sea_orm::DbErr> {
    let res = articles::Entity::delete_by_id(article_id).exec(conn).await?;
    Ok(res.rows_affected)
}
