use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /v1/login?user=<uuid>`
pub async fn login(
    query: web::Query<LoginQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let raw = query
        .user
        .as_deref()
        .ok_or_else(|| AppError::invalid(ErrorCode::InvalidUserId, "Missing user parameter"))?;
    let user_id = Uuid::parse_str(raw)
        .map_err(|_| AppError::invalid(ErrorCode::InvalidUserId, "Invalid user id"))?;

    let token = crate::auth::login::login(
        &app_state.users,
        user_id,
        &app_state.security,
        SystemTime::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
