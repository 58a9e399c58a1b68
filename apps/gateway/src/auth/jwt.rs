use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthFailure};
use crate::errors::ErrorCode;
use crate::repos::users::User;
use crate::state::security_config::{SecurityConfig, TOKEN_AUDIENCE, TOKEN_ISSUER};

/// HMAC algorithms a token may be signed with. Anything else is refused
/// before the signature is checked.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims included in gateway-issued access tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Display name (username)
    pub name: String,
    pub email: String,
    pub iss: String,
    pub aud: Vec<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Not-before (seconds since epoch)
    pub nbf: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint an access token for `user`, valid from `now` for the configured TTL.
pub fn mint_access_token(
    user: &User,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .ok_or_else(|| AppError::internal(ErrorCode::TokenSigning, "clock outside token range"))?;
    let exp = i64::try_from(security.token_ttl.as_secs())
        .ok()
        .and_then(|ttl| iat.checked_add(ttl))
        .ok_or_else(|| AppError::internal(ErrorCode::TokenSigning, "token lifetime out of range"))?;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        email: user.email.clone(),
        iss: TOKEN_ISSUER.to_string(),
        aud: vec![TOKEN_AUDIENCE.to_string()],
        iat,
        nbf: iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(ErrorCode::TokenSigning, format!("Failed to encode JWT: {e}")))
}

/// Verify a token against the wall clock.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    verify_access_token_at(token, security, SystemTime::now())
}

/// Verify signature, algorithm, issuer and audience, then check that `now`
/// lies within `[nbf, exp]`.
///
/// The window check runs here rather than in `jsonwebtoken` so it compares
/// at full clock precision with no leeway: a token is still accepted exactly
/// at `exp` and rejected one nanosecond later.
pub fn verify_access_token_at(
    token: &str,
    security: &SecurityConfig,
    now: SystemTime,
) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["sub", "iss", "aud", "exp", "nbf", "iat"]);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized(AuthFailure::Expired),
        ErrorKind::ImmatureSignature => AppError::unauthorized(AuthFailure::NotYetValid),
        _ => AppError::unauthorized(AuthFailure::InvalidToken),
    })?;

    check_window(&claims, now)?;
    Ok(claims)
}

fn check_window(claims: &Claims, now: SystemTime) -> Result<(), AppError> {
    if claims.iat > claims.nbf || claims.nbf > claims.exp || claims.nbf < 0 {
        return Err(AppError::unauthorized(AuthFailure::InvalidToken));
    }

    let at = |secs: i64| UNIX_EPOCH.checked_add(Duration::from_secs(secs as u64));
    let (Some(nbf), Some(exp)) = (at(claims.nbf), at(claims.exp)) else {
        return Err(AppError::unauthorized(AuthFailure::InvalidToken));
    };

    if now < nbf {
        return Err(AppError::unauthorized(AuthFailure::NotYetValid));
    }
    if now > exp {
        return Err(AppError::unauthorized(AuthFailure::Expired));
    }
    Ok(())
}
