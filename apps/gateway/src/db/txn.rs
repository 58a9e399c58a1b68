//! Transaction helpers for multi-step writes.
//!
//! `commit` and `rollback` consume the `DatabaseTransaction`, so a handle can
//! never be finished twice. A transaction dropped without either is rolled
//! back by SeaORM, which covers early returns and cancelled futures.

use std::fmt;

use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use tracing::{debug, warn};

use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_db_err;

/// Step of a multi-step write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStep {
    Begin,
    CreateUser,
    CreateArticle,
    Commit,
}

impl TxnStep {
    pub const fn label(&self) -> &'static str {
        match self {
            TxnStep::Begin => "begin-failed",
            TxnStep::CreateUser => "create-user-failed",
            TxnStep::CreateArticle => "create-article-failed",
            TxnStep::Commit => "commit-failed",
        }
    }
}

impl fmt::Display for TxnStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a transactional write, classified by the step that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{step}: {source}")]
pub struct TxnError {
    pub step: TxnStep,
    pub source: DomainError,
}

impl TxnError {
    pub fn new(step: TxnStep, source: DomainError) -> Self {
        Self { step, source }
    }
}

/// Begin a read-committed transaction on the pool.
pub async fn begin_read_committed(db: &DatabaseConnection) -> Result<DatabaseTransaction, TxnError> {
    db.begin_with_config(Some(IsolationLevel::ReadCommitted), None)
        .await
        .map_err(|e| TxnError::new(TxnStep::Begin, map_db_err(e)))
}

/// Roll back after a failed step. A rollback error means the transaction is
/// already finished on the server side, so it is logged and never surfaced.
pub async fn rollback_quietly(txn: DatabaseTransaction, step: TxnStep) {
    match txn.rollback().await {
        Ok(()) => debug!(step = step.label(), "transaction rolled back"),
        Err(e) => warn!(step = step.label(), error = %e, "rollback after failure returned an error; ignoring"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::domain::InfraErrorKind;

    #[test]
    fn step_labels_are_stable() {
        assert_eq!(TxnStep::Begin.label(), "begin-failed");
        assert_eq!(TxnStep::CreateUser.label(), "create-user-failed");
        assert_eq!(TxnStep::CreateArticle.label(), "create-article-failed");
        assert_eq!(TxnStep::Commit.to_string(), "commit-failed");
    }

    #[test]
    fn error_display_leads_with_step() {
        let err = TxnError::new(
            TxnStep::Commit,
            DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable"),
        );
        assert!(err.to_string().starts_with("commit-failed: "));
    }
}
