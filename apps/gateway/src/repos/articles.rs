//! Article repository: domain model, capability trait and SeaORM implementation.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::articles_sea::{self as articles_adapter, ArticleCreate, ArticleUpdate};
use crate::errors::domain::DomainError;

/// Article domain model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

#[async_trait]
pub trait ArticleRepo: Send + Sync {
    async fn create_article(&self, dto: ArticleCreate) -> Result<Article, DomainError>;
    async fn find_article_by_id(&self, article_id: Uuid) -> Result<Option<Article>, DomainError>;
    async fn list_articles(&self) -> Result<Vec<Article>, DomainError>;
    async fn list_articles_by_author(&self, author_id: Uuid) -> Result<Vec<Article>, DomainError>;
    async fn update_article(
        &self,
        article_id: Uuid,
        dto: ArticleUpdate,
    ) -> Result<Option<Article>, DomainError>;
    async fn delete_article(&self, article_id: Uuid) -> Result<bool, DomainError>;
}

pub struct ArticleRepoSea<'c, C> {
    conn: &'c C,
}

impl<'c, C> ArticleRepoSea<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c, C: ConnectionTrait + Send + Sync> ArticleRepo for ArticleRepoSea<'c, C> {
    async fn create_article(&self, dto: ArticleCreate) -> Result<Article, DomainError> {
        let article = articles_adapter::create_article(self.conn, dto)
            .await
            .map_err(|e| DomainError::from(e).with_context("create article"))?;
        Ok(Article::from(article))
    }

    async fn find_article_by_id(&self, article_id: Uuid) -> Result<Option<Article>, DomainError> {
        let article = articles_adapter::find_article_by_id(self.conn, article_id)
            .await
            .map_err(|e| DomainError::from(e).with_context("get article"))?;
        Ok(article.map(Article::from))
    }

    async fn list_articles(&self) -> Result<Vec<Article>, DomainError> {
        let articles = articles_adapter::list_articles(self.conn)
            .await
            .map_err(|e| DomainError::from(e).with_context("list articles"))?;
        Ok(articles.into_iter().map(Article::from).collect())
    }

    async fn list_articles_by_author(&self, author_id: Uuid) -> Result<Vec<Article>, DomainError> {
        let articles = articles_adapter::list_articles_by_author(self.conn, author_id)
            .await
            .map_err(|e| DomainError::from(e).with_context("list articles by author"))?;
        Ok(articles.into_iter().map(Article::from).collect())
    }

    async fn update_article(
        &self,
        article_id: Uuid,
        dto: ArticleUpdate,
    ) -> Result<Option<Article>, DomainError> {
        let article = articles_adapter::update_article(self.conn, article_id, dto)
            .await
            .map_err(|e| DomainError::from(e).with_context("update article"))?;
        Ok(article.map(Article::from))
    }

    async fn delete_article(&self, article_id: Uuid) -> Result<bool, DomainError> {
        let removed = articles_adapter::delete_article(self.conn, article_id)
            .await
            .map_err(|e| DomainError::from(e).with_context("delete article"))?;
        Ok(removed > 0)
    }
}

impl From<crate::entities::articles::Model> for Article {
    fn from(model: crate::entities::articles::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            author_id: model.author_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
