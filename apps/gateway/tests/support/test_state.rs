use std::time::{Duration, SystemTime};

use gateway::config::{DatabaseConfig, RateLimitConfig};
use gateway::infra::db::bootstrap_db;
use gateway::infra::state::build_state;
use gateway::repos::User;
use gateway::state::app_state::AppState;
use gateway::state::security_config::SecurityConfig;
use gateway::mint_access_token;
use sea_orm::DatabaseConnection;

pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_purposes_only";

/// Fresh, migrated, single-connection in-memory SQLite database.
pub async fn test_db() -> DatabaseConnection {
    bootstrap_db(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database should bootstrap")
}

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET.to_vec(), Duration::from_secs(900))
}

/// State with a bucket large enough that tests never hit it.
pub async fn test_state() -> AppState {
    test_state_with(RateLimitConfig {
        interval: Duration::from_secs(1),
        burst: 10_000,
    })
    .await
}

pub async fn test_state_with(rate_limit: RateLimitConfig) -> AppState {
    build_state()
        .with_connection(test_db().await)
        .with_security(test_security())
        .with_rate_limit(rate_limit)
        .build()
        .await
        .expect("test state should build")
}

/// `Authorization` header value carrying a fresh token for `user`.
pub fn bearer_for(user: &User, security: &SecurityConfig) -> String {
    let token = mint_access_token(user, SystemTime::now(), security).expect("token should mint");
    format!("Bearer {token}")
}
