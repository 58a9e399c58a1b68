use std::sync::Arc;

use actix_web::web;

use crate::middleware::{protected_chain, public_chain};
use crate::state::app_state::AppState;

pub mod articles;
pub mod auth;
pub mod health;
pub mod users;

/// Register every route.
///
/// `/health` runs bare, `/v1/login` only behind the request logger, and the
/// rest of `/v1` behind the full protected chain. The login resource is
/// registered first so the `/v1` scope never sees it.
pub fn configure(cfg: &mut web::ServiceConfig, state: &web::Data<AppState>) {
    cfg.app_data(state.clone());

    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    cfg.service(
        web::resource("/v1/login")
            .wrap(public_chain())
            .route(web::post().to(auth::login)),
    );

    cfg.service(
        web::scope("/v1")
            .wrap(protected_chain(
                state.security.clone(),
                Arc::clone(&state.rate_limiter),
            ))
            .configure(users::configure_routes)
            .configure(articles::configure_routes),
    );
}
