use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::articles_sea::{ArticleCreate, ArticleUpdate};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::{Article, RepoFactory, SeaRepos};

fn article_not_found(article_id: Uuid) -> DomainError {
    DomainError::not_found(NotFoundKind::Article, format!("Article {article_id} not found"))
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    if title.len() > 255 {
        return Err(DomainError::validation("title must be at most 255 characters"));
    }
    Ok(())
}

pub struct ArticleService<R: RepoFactory = SeaRepos> {
    db: DatabaseConnection,
    repos: Arc<R>,
}

impl<R: RepoFactory> Clone for ArticleService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            repos: Arc::clone(&self.repos),
        }
    }
}

impl ArticleService<SeaRepos> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_repos(db, SeaRepos)
    }
}

impl<R: RepoFactory> ArticleService<R> {
    pub fn with_repos(db: DatabaseConnection, repos: R) -> Self {
        Self {
            db,
            repos: Arc::new(repos),
        }
    }

    /// A missing author surfaces as a validation error from the foreign key.
    pub async fn create_article(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Article, DomainError> {
        validate_title(title)?;

        let article = self
            .repos
            .articles(&self.db)
            .create_article(ArticleCreate::new(title, content, author_id))
            .await
            .inspect_err(|e| warn!(author_id = %author_id, error = %e, "create article failed"))?;
        info!(article_id = %article.id, author_id = %author_id, "article created");
        Ok(article)
    }

    pub async fn get_article(&self, article_id: Uuid) -> Result<Article, DomainError> {
        self.repos
            .articles(&self.db)
            .find_article_by_id(article_id)
            .await?
            .ok_or_else(|| article_not_found(article_id))
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>, DomainError> {
        self.repos.articles(&self.db).list_articles().await
    }

    pub async fn update_article(
        &self,
        article_id: Uuid,
        dto: ArticleUpdate,
    ) -> Result<Article, DomainError> {
        if let Some(title) = dto.title.as_deref() {
            validate_title(title)?;
        }

        let article = self
            .repos
            .articles(&self.db)
            .update_article(article_id, dto)
            .await?
            .ok_or_else(|| article_not_found(article_id))?;
        info!(article_id = %article.id, "article updated");
        Ok(article)
    }

    pub async fn delete_article(&self, article_id: Uuid) -> Result<(), DomainError> {
        if !self.repos.articles(&self.db).delete_article(article_id).await? {
            return Err(article_not_found(article_id));
        }
        info!(article_id = %article_id, "article deleted");
        Ok(())
    }
}
