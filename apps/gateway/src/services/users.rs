use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::articles_sea::ArticleCreate;
use crate::adapters::users_sea::{UserCreate, UserUpdate};
use crate::db::txn::{begin_read_committed, rollback_quietly, TxnError, TxnStep};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::infra::db_errors::map_db_err;
use crate::logging::pii::Redacted;
use crate::repos::{Article, RepoFactory, SeaRepos, User};

/// A user together with the article created alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithArticle {
    pub user: User,
    pub article: Article,
}

pub fn welcome_title(username: &str) -> String {
    format!("Welcome {username}")
}

pub fn welcome_content(username: &str) -> String {
    format!("Thank you for joining our platform, {username}! This is your first article.")
}

pub(crate) fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username must not be empty"));
    }
    if username.len() > 64 {
        return Err(DomainError::validation("username must be at most 64 characters"));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), DomainError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation("email is not a valid address")),
    }
}

fn user_not_found(user_id: Uuid) -> DomainError {
    DomainError::not_found(NotFoundKind::User, format!("User {user_id} not found"))
}

/// User operations. Repositories come from `R`, bound per call to the pool
/// or to a transaction.
pub struct UserService<R: RepoFactory = SeaRepos> {
    db: DatabaseConnection,
    repos: Arc<R>,
}

impl<R: RepoFactory> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            repos: Arc::clone(&self.repos),
        }
    }
}

impl UserService<SeaRepos> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_repos(db, SeaRepos)
    }
}

impl<R: RepoFactory> UserService<R> {
    pub fn with_repos(db: DatabaseConnection, repos: R) -> Self {
        Self {
            db,
            repos: Arc::new(repos),
        }
    }

    pub async fn create_user(&self, username: &str, email: &str) -> Result<User, DomainError> {
        validate_username(username)?;
        validate_email(email)?;

        let user = self
            .repos
            .users(&self.db)
            .create_user(UserCreate::new(username, email))
            .await
            .inspect_err(|e| {
                warn!(username, email = %Redacted(email), error = %e, "create user failed")
            })?;
        info!(user_id = %user.id, username, "user created");
        Ok(user)
    }

    /// Create a user and its welcome article atomically.
    ///
    /// Both inserts run in one read-committed transaction. Any failure rolls
    /// the transaction back before returning, so the user row is never
    /// visible without its article. The error names the step that failed.
    pub async fn create_user_with_welcome_article(
        &self,
        username: &str,
        email: &str,
    ) -> Result<UserWithArticle, TxnError> {
        validate_username(username)
            .and_then(|()| validate_email(email))
            .map_err(|e| TxnError::new(TxnStep::CreateUser, e))?;

        let txn = begin_read_committed(&self.db).await.inspect_err(|e| {
            error!(step = e.step.label(), username, error = %e.source, "could not begin transaction")
        })?;

        // Repos borrow the transaction; release them before it is consumed.
        let users = self.repos.users(&txn);
        let created = users.create_user(UserCreate::new(username, email)).await;
        drop(users);
        let user = match created {
            Ok(user) => user,
            Err(source) => {
                warn!(step = TxnStep::CreateUser.label(), username, email = %Redacted(email), error = %source, "rolling back");
                rollback_quietly(txn, TxnStep::CreateUser).await;
                return Err(TxnError::new(TxnStep::CreateUser, source));
            }
        };

        let welcome = ArticleCreate::new(
            welcome_title(&user.username),
            welcome_content(&user.username),
            user.id,
        );
        let articles = self.repos.articles(&txn);
        let created = articles.create_article(welcome).await;
        drop(articles);
        let article = match created {
            Ok(article) => article,
            Err(source) => {
                warn!(step = TxnStep::CreateArticle.label(), user_id = %user.id, username, error = %source, "rolling back");
                rollback_quietly(txn, TxnStep::CreateArticle).await;
                return Err(TxnError::new(TxnStep::CreateArticle, source));
            }
        };

        // A commit that fails can leave the transaction open (SQLite keeps it
        // after a deferred constraint error); dropping the handle rolls it back.
        if let Err(e) = txn.commit().await {
            let source = map_db_err(e);
            error!(step = TxnStep::Commit.label(), user_id = %user.id, article_id = %article.id, error = %source, "commit failed");
            return Err(TxnError::new(TxnStep::Commit, source));
        }

        info!(user_id = %user.id, article_id = %article.id, username, "user created with welcome article");
        Ok(UserWithArticle { user, article })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.repos
            .users(&self.db)
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repos.users(&self.db).find_user_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.repos.users(&self.db).list_users().await
    }

    pub async fn update_user(&self, user_id: Uuid, dto: UserUpdate) -> Result<User, DomainError> {
        if let Some(username) = dto.username.as_deref() {
            validate_username(username)?;
        }
        if let Some(email) = dto.email.as_deref() {
            validate_email(email)?;
        }

        let user = self
            .repos
            .users(&self.db)
            .update_user(user_id, dto)
            .await
            .inspect_err(|e| warn!(user_id = %user_id, error = %e, "update user failed"))?
            .ok_or_else(|| user_not_found(user_id))?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Remove a user. Their articles go with them.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), DomainError> {
        let removed = self.repos.users(&self.db).delete_user(user_id).await?;
        if !removed {
            return Err(user_not_found(user_id));
        }
        info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    pub async fn list_user_articles(&self, user_id: Uuid) -> Result<Vec<Article>, DomainError> {
        self.get_user(user_id).await?;
        self.repos
            .articles(&self.db)
            .list_articles_by_author(user_id)
            .await
    }
}
