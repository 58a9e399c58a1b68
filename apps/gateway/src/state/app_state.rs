use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::middleware::rate_limit::TokenBucket;
use crate::services::articles::ArticleService;
use crate::services::users::UserService;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// JWT settings
    pub security: SecurityConfig,
    /// Shared bucket for the protected scope
    pub rate_limiter: Arc<TokenBucket>,
    pub users: UserService,
    pub articles: ArticleService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, security: SecurityConfig, rate_limiter: TokenBucket) -> Self {
        Self {
            users: UserService::new(db.clone()),
            articles: ArticleService::new(db.clone()),
            db,
            security,
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}
