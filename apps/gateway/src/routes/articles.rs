use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::adapters::articles_sea::ArticleUpdate;
use crate::error::AppError;
use crate::extractors::{ArticleId, CurrentUser, ValidatedJson};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// `POST /v1/articles`: authored by the caller.
async fn create_article(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateArticleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let article = app_state
        .articles
        .create_article(current_user.id, &body.title, &body.content)
        .await?;
    Ok(HttpResponse::Created().json(article))
}

async fn list_articles(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let articles = app_state.articles.list_articles().await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn get_article(id: ArticleId, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let article = app_state.articles.get_article(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn update_article(
    id: ArticleId,
    app_state: web::Data<AppState>,
    body: ValidatedJson<UpdateArticleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let dto = ArticleUpdate {
        title: body.title,
        content: body.content,
    };
    let article = app_state
        .articles
        .update_article(id.into_inner(), dto)
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn delete_article(
    id: ArticleId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.articles.delete_article(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/articles")
            .route(web::get().to(list_articles))
            .route(web::post().to(create_article)),
    )
    .service(
        web::resource("/articles/{id}")
            .route(web::get().to(get_article))
            .route(web::put().to(update_article))
            .route(web::delete().to(delete_article)),
    );
}
