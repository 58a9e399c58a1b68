use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use gateway::routes;
use gateway::state::app_state::AppState;

/// Production routes and chains over the given state.
pub async fn create_test_app(
    data: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(App::new().configure(move |cfg| routes::configure(cfg, &data))).await
}
