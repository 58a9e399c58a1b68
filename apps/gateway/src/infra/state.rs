use sea_orm::DatabaseConnection;

use crate::config::{DatabaseConfig, RateLimitConfig};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::middleware::rate_limit::TokenBucket;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

enum DbSource {
    Config(DatabaseConfig),
    Connection(DatabaseConnection),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: Option<SecurityConfig>,
    rate_limit: RateLimitConfig,
    db: Option<DbSource>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: None,
            rate_limit: RateLimitConfig::default(),
            db: None,
        }
    }

    /// Connect and migrate from this config during `build`.
    pub fn with_database(mut self, cfg: DatabaseConfig) -> Self {
        self.db = Some(DbSource::Config(cfg));
        self
    }

    /// Use an already-open (and migrated) pool.
    pub fn with_connection(mut self, conn: DatabaseConnection) -> Self {
        self.db = Some(DbSource::Connection(conn));
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = Some(security_config);
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let security = self
            .security_config
            .ok_or_else(|| AppError::config("security config is required"))?;

        let conn = match self.db {
            Some(DbSource::Config(cfg)) => bootstrap_db(&cfg).await?,
            Some(DbSource::Connection(conn)) => conn,
            None => return Err(AppError::config("database is required")),
        };

        let bucket = TokenBucket::new(self.rate_limit.burst, self.rate_limit.interval);
        Ok(AppState::new(conn, security, bucket))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
