#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

// Re-exports for public API
pub use auth::jwt::{mint_access_token, verify_access_token, verify_access_token_at, Claims};
pub use config::GatewayConfig;
pub use db::txn::{TxnError, TxnStep};
pub use error::AppError;
pub use extractors::{ArticleId, CurrentUser, RequestLog, UserId, ValidatedJson};
pub use infra::db::{bootstrap_db, connect_db};
pub use infra::state::build_state;
pub use middleware::{protected_chain, public_chain, Chain, Interceptor, TokenBucket};
pub use services::users::{UserService, UserWithArticle};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    gateway_test_support::logging::init();
}
