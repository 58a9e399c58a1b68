use std::convert::Infallible;
use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use tracing::Span;

use crate::middleware::context::request_span;

/// The span bound to this request by the request logger.
///
/// Falls back to a default span (with a warning) when no logger ran, so
/// extraction never fails.
#[derive(Debug, Clone)]
pub struct RequestLog(pub Span);

impl Deref for RequestLog {
    type Target = Span;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for RequestLog {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(RequestLog(request_span(&req.extensions()))))
    }
}
