use std::time::Duration;

use actix_web::error::ResponseError;
use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::db::txn::TxnError;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// Plain-text body for a request that carried no usable credential.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";
/// Plain-text body for a credential that failed verification.
pub const INVALID_TOKEN_BODY: &str = "Invalid or expired token";
/// Plain-text body for a rate-limited request.
pub const RATE_LIMITED_BODY: &str = "Rate limit reached. Please try after sometime.";

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No `Authorization` header, or not of the form `Bearer <token>`
    MissingBearer,
    /// Bad signature, wrong algorithm, malformed token or claims
    InvalidToken,
    /// Past the expires-at bound
    Expired,
    /// Before the not-before bound
    NotYetValid,
}

impl AuthFailure {
    pub const fn code(&self) -> ErrorCode {
        match self {
            AuthFailure::MissingBearer => ErrorCode::UnauthorizedMissingBearer,
            AuthFailure::InvalidToken => ErrorCode::UnauthorizedInvalidJwt,
            AuthFailure::Expired => ErrorCode::UnauthorizedExpiredJwt,
            AuthFailure::NotYetValid => ErrorCode::UnauthorizedImmatureJwt,
        }
    }

    const fn body(&self) -> &'static str {
        match self {
            AuthFailure::MissingBearer => UNAUTHORIZED_BODY,
            _ => INVALID_TOKEN_BODY,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Unauthorized: {}", reason.code())]
    Unauthorized { reason: AuthFailure },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Rate limited; retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
    #[error("Database error: {detail}")]
    Db { code: ErrorCode, detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Unauthorized { reason } => reason.code(),
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Db { code, .. } => *code,
            AppError::DbUnavailable { .. } => ErrorCode::DbUnavailable,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Db { detail, .. }
            | AppError::DbUnavailable { detail }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
            AppError::Unauthorized { reason } => reason.body().to_string(),
            AppError::RateLimited { .. } => RATE_LIMITED_BODY.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Db { .. }
            | AppError::DbUnavailable { .. }
            | AppError::Internal { .. }
            | AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::invalid(ErrorCode::BadRequest, detail)
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(reason: AuthFailure) -> Self {
        Self::Unauthorized { reason }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whole seconds for a `Retry-After` header, rounded up and never zero.
pub fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(detail) => AppError::invalid(ErrorCode::ValidationError, detail),
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::User => ErrorCode::UserNotFound,
                    NotFoundKind::Article => ErrorCode::ArticleNotFound,
                    _ => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::UniqueUsername => ErrorCode::UniqueUsername,
                    ConflictKind::UniqueEmail => ErrorCode::UniqueEmail,
                    _ => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::Infra(InfraErrorKind::DbUnavailable, detail) => {
                AppError::DbUnavailable { detail }
            }
            DomainError::Infra(InfraErrorKind::Timeout, detail) => AppError::Db {
                code: ErrorCode::DbTimeout,
                detail,
            },
            DomainError::Infra(_, detail) => AppError::Db {
                code: ErrorCode::DbError,
                detail,
            },
        }
    }
}

impl From<TxnError> for AppError {
    /// The status follows the failing step's cause; the detail names the step.
    fn from(err: TxnError) -> Self {
        let label = err.step.label();
        match AppError::from(err.source) {
            AppError::Db { detail, .. } | AppError::DbUnavailable { detail } => {
                AppError::internal(ErrorCode::TransactionFailed, format!("{label}: {detail}"))
            }
            AppError::Validation { code, detail } => AppError::Validation {
                code,
                detail: format!("{label}: {detail}"),
            },
            AppError::NotFound { code, detail } => AppError::NotFound {
                code,
                detail: format!("{label}: {detail}"),
            },
            AppError::Conflict { code, detail } => AppError::Conflict {
                code,
                detail: format!("{label}: {detail}"),
            },
            other => other,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_ctx::request_id();

        match self {
            AppError::Unauthorized { reason } => {
                return HttpResponse::build(status)
                    .content_type(ContentType::plaintext())
                    .body(reason.body());
            }
            AppError::RateLimited { retry_after } => {
                return HttpResponse::build(status)
                    .content_type(ContentType::plaintext())
                    .insert_header((header::RETRY_AFTER, retry_after_secs(*retry_after)))
                    .body(RATE_LIMITED_BODY);
            }
            _ => {}
        }

        let code = self.code();
        let problem_details = ProblemDetails {
            type_: format!("https://gateway.local/errors/{}", code.as_str()),
            title: Self::humanize_code(code.as_str()),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.as_str().to_string(),
            trace_id,
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}
