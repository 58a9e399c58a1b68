//! Error codes for the gateway API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Invalid JWT token
    UnauthorizedInvalidJwt,
    /// JWT token has expired
    UnauthorizedExpiredJwt,
    /// JWT token is not valid yet
    UnauthorizedImmatureJwt,

    // Request Validation
    /// Invalid user ID provided
    InvalidUserId,
    /// Invalid article ID provided
    InvalidArticleId,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// User not found
    UserNotFound,
    /// Article not found
    ArticleNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Username already taken
    UniqueUsername,
    /// Email already registered
    UniqueEmail,
    /// Generic conflict
    Conflict,

    // Throughput
    /// Rate limit reached
    RateLimited,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Database timeout
    DbTimeout,
    /// Transaction could not be completed
    TransactionFailed,
    /// Token signing failure
    TokenSigning,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::UnauthorizedImmatureJwt => "UNAUTHORIZED_IMMATURE_JWT",

            Self::InvalidUserId => "INVALID_USER_ID",
            Self::InvalidArticleId => "INVALID_ARTICLE_ID",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ArticleNotFound => "ARTICLE_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::UniqueUsername => "UNIQUE_USERNAME",
            Self::UniqueEmail => "UNIQUE_EMAIL",
            Self::Conflict => "CONFLICT",

            Self::RateLimited => "RATE_LIMITED",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::TransactionFailed => "TRANSACTION_FAILED",
            Self::TokenSigning => "TOKEN_SIGNING",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
