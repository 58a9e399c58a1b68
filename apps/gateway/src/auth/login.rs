//! Login: exchange a user id for a signed access token.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwt::mint_access_token;
use crate::error::AppError;
use crate::repos::RepoFactory;
use crate::services::users::UserService;
use crate::state::security_config::SecurityConfig;

/// Look up the user and mint a token for them, valid from `now`.
///
/// Unknown users are `NotFound`; signing failures are internal errors.
pub async fn login<R: RepoFactory>(
    users: &UserService<R>,
    user_id: Uuid,
    security: &SecurityConfig,
    now: SystemTime,
) -> Result<String, AppError> {
    let user = users.get_user(user_id).await.map_err(|e| {
        warn!(user_id = %user_id, error = %e, "login for unknown user");
        AppError::from(e)
    })?;

    let token = mint_access_token(&user, now, security)?;
    info!(user_id = %user.id, ttl_secs = security.token_ttl.as_secs(), "access token issued");
    Ok(token)
}
