use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Strip credentials from a database URL so it can be logged.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}"),
        None => url.to_string(),
    }
}

/// Open the connection pool. Does NOT run migrations.
pub async fn connect_db(cfg: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(1)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(false);

    let conn = Database::connect(opts)
        .await
        .map_err(|e| AppError::from(crate::infra::db_errors::map_db_err(e)))?;

    info!(url = %sanitize_db_url(&cfg.url), max_connections = cfg.max_connections, "database pool ready");
    Ok(conn)
}

/// Open the pool and bring the schema up to date.
pub async fn bootstrap_db(cfg: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(cfg).await?;
    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::config(format!("migration failed: {e}")))?;
    Ok(conn)
}
