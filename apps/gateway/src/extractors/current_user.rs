use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::error::{AppError, AuthFailure};

/// Identity of the caller, taken from the claims the authenticator stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized(AuthFailure::InvalidToken))?;
        Ok(Self {
            id,
            username: claims.name.clone(),
            email: claims.email.clone(),
        })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<Claims>() {
            Some(claims) => CurrentUser::try_from(claims),
            None => Err(AppError::unauthorized(AuthFailure::MissingBearer)),
        };
        ready(result)
    }
}
