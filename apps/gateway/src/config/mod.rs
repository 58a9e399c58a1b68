//! Process configuration resolved from `GATEWAY_*` environment variables.
//!
//! Loading goes through a lookup function so tests can feed a map instead of
//! mutating the process environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const PREFIX: &str = "GATEWAY_";

/// Upper bound on access-token lifetime: one year.
const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEncoding {
    Json,
    Console,
}

impl FromStr for LogEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogEncoding::Json),
            "console" => Ok(LogEncoding::Console),
            other => Err(format!("unknown log encoding {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub encoding: LogEncoding,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            encoding: LogEncoding::Json,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Single-connection in-memory SQLite, used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &crate::infra::db::sanitize_db_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub interval: Duration,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            burst: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, which receives full variable
    /// names such as `GATEWAY_PORT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: var_or(&lookup, "HOST", "0.0.0.0".to_string())?,
            port: var_or(&lookup, "PORT", 8080u16)?,
            shutdown_timeout: Duration::from_secs(var_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30u64)?),
        };

        let log = LogConfig {
            level: var_or(&lookup, "LOG_LEVEL", "info".to_string())?,
            encoding: var_or(&lookup, "LOG_ENCODING", LogEncoding::Json)?,
        };

        let database = DatabaseConfig {
            url: must_var(&lookup, "DATABASE_URL")?,
            max_connections: var_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?,
            acquire_timeout: Duration::from_secs(var_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                5u64,
            )?),
        };

        let expiration_secs: u64 = var_or(&lookup, "JWT_EXPIRATION_SECS", 900)?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&expiration_secs) {
            return Err(AppError::config(format!(
                "{PREFIX}JWT_EXPIRATION_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}"
            )));
        }
        let jwt = JwtConfig {
            secret: must_var(&lookup, "JWT_SECRET")?,
            expiration: Duration::from_secs(expiration_secs),
        };

        let interval_ms: u64 = var_or(&lookup, "RATE_LIMIT_INTERVAL_MS", 1000)?;
        if interval_ms == 0 {
            return Err(AppError::config(format!(
                "{PREFIX}RATE_LIMIT_INTERVAL_MS must be greater than zero"
            )));
        }
        let burst: u32 = var_or(&lookup, "RATE_LIMIT_BURST", 10)?;
        if burst == 0 {
            return Err(AppError::config(format!(
                "{PREFIX}RATE_LIMIT_BURST must be at least 1"
            )));
        }
        let rate_limit = RateLimitConfig {
            interval: Duration::from_millis(interval_ms),
            burst,
        };

        Ok(Self {
            server,
            log,
            database,
            jwt,
            rate_limit,
        })
    }
}

/// Required, non-empty variable.
fn must_var<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&format!("{PREFIX}{name}")) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(AppError::config(format!("{PREFIX}{name} must not be empty"))),
        None => Err(AppError::config(format!("{PREFIX}{name} must be set"))),
    }
}

/// Optional variable parsed as `T`; unparsable values are errors, never defaults.
fn var_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(&format!("{PREFIX}{name}")) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{PREFIX}{name} has an invalid value"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "postgres://u:p@localhost/db"),
            ("GATEWAY_JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(cfg.log.encoding, LogEncoding::Json);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.jwt.expiration, Duration::from_secs(900));
        assert_eq!(cfg.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "sqlite::memory:"),
            ("GATEWAY_JWT_SECRET", "s3cret"),
            ("GATEWAY_PORT", "9000"),
            ("GATEWAY_LOG_ENCODING", "console"),
            ("GATEWAY_RATE_LIMIT_INTERVAL_MS", "250"),
            ("GATEWAY_RATE_LIMIT_BURST", "3"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.log.encoding, LogEncoding::Console);
        assert_eq!(cfg.rate_limit.interval, Duration::from_millis(250));
        assert_eq!(cfg.rate_limit.burst, 3);
    }

    #[test]
    fn missing_secret_names_the_variable() {
        let err = GatewayConfig::from_lookup(lookup_from(&[(
            "GATEWAY_DATABASE_URL",
            "sqlite::memory:",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("GATEWAY_JWT_SECRET"));
    }

    #[test]
    fn invalid_value_does_not_echo_it() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "sqlite::memory:"),
            ("GATEWAY_JWT_SECRET", "s3cret"),
            ("GATEWAY_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("GATEWAY_PORT"));
        assert!(!msg.contains("not-a-port"));
    }

    #[test]
    fn zero_burst_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "sqlite::memory:"),
            ("GATEWAY_JWT_SECRET", "s3cret"),
            ("GATEWAY_RATE_LIMIT_BURST", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GATEWAY_RATE_LIMIT_BURST"));
    }

    #[test]
    fn token_lifetime_must_be_positive_and_bounded() {
        for ttl in ["0", "31536001", "9223372036854775807"] {
            let err = GatewayConfig::from_lookup(lookup_from(&[
                ("GATEWAY_DATABASE_URL", "sqlite::memory:"),
                ("GATEWAY_JWT_SECRET", "s3cret"),
                ("GATEWAY_JWT_EXPIRATION_SECS", ttl),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("GATEWAY_JWT_EXPIRATION_SECS"), "{ttl}");
        }

        let cfg = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "sqlite::memory:"),
            ("GATEWAY_JWT_SECRET", "s3cret"),
            ("GATEWAY_JWT_EXPIRATION_SECS", "31536000"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt.expiration, Duration::from_secs(31_536_000));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_DATABASE_URL", "postgres://app:hunter2@db/app"),
            ("GATEWAY_JWT_SECRET", "top-secret-value"),
        ]))
        .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("top-secret-value"));
        assert!(!dbg.contains("hunter2"));
    }
}
