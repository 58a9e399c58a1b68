//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repositories convert it here so higher
//! layers only ever see `DomainError`.

use sea_orm::DbErr;
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Pick the conflict kind from the constraint named in the message.
///
/// SQLite reports `UNIQUE constraint failed: users.email`, Postgres reports the
/// constraint name (`users_email_key`).
fn unique_conflict(error_msg: &str) -> (ConflictKind, &'static str) {
    if error_msg.contains("users.username") || error_msg.contains("users_username_key") {
        return (ConflictKind::UniqueUsername, "Username already taken");
    }
    if error_msg.contains("users.email") || error_msg.contains("users_email_key") {
        return (ConflictKind::UniqueEmail, "Email already registered");
    }
    (
        ConflictKind::Other("Unique".into()),
        "Unique constraint violation",
    )
}

fn is_acquire_timeout(e: &DbErr) -> bool {
    matches!(
        e,
        DbErr::ConnectionAcquire(sea_orm::ConnAcquireErr::Timeout)
    )
}

/// Translate a `DbErr` into a `DomainError` with sanitized, PII-safe detail.
pub fn map_db_err(e: DbErr) -> DomainError {
    let error_msg = e.to_string();
    let request_id = trace_ctx::request_id();

    match &e {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        _ if is_acquire_timeout(&e) => {
            warn!(request_id = %request_id, "Timed out acquiring a database connection");
            return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
        }
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(request_id = %request_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(request_id = %request_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");
        let (kind, detail) = unique_conflict(&error_msg);
        return DomainError::conflict(kind, detail);
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(request_id = %request_id, raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return DomainError::validation("Referenced record does not exist");
    }

    error!(request_id = %request_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        map_db_err(e)
    }
}
