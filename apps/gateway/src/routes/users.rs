use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::adapters::users_sea::UserUpdate;
use crate::error::AppError;
use crate::extractors::{RequestLog, UserId, ValidatedJson};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            username: req.username,
            email: req.email,
        }
    }
}

/// `POST /v1/users`: the user and its welcome article, created together.
async fn create_user(
    log: RequestLog,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let created = app_state
        .users
        .create_user_with_welcome_article(&body.username, &body.email)
        .await?;

    info!(parent: &*log, user_id = %created.user.id, article_id = %created.article.id, "user registered");
    Ok(HttpResponse::Created().json(created))
}

async fn list_users(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = app_state.users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

async fn get_user(id: UserId, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = app_state.users.get_user(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn update_user(
    id: UserId,
    app_state: web::Data<AppState>,
    body: ValidatedJson<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = app_state
        .users
        .update_user(id.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn delete_user(id: UserId, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    app_state.users.delete_user(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list_user_articles(
    id: UserId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let articles = app_state.users.list_user_articles(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::get().to(list_users))
            .route(web::post().to(create_user)),
    )
    .service(
        web::resource("/users/{id}")
            .route(web::get().to(get_user))
            .route(web::put().to(update_user))
            .route(web::delete().to(delete_user)),
    )
    .service(web::resource("/users/{id}/articles").route(web::get().to(list_user_articles)));
}
