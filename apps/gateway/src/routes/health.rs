use actix_web::HttpResponse;

/// Liveness probe. No middleware, no database.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}
