//! Bearer-token authenticator interceptor.

use std::future::ready;

use actix_web::dev::ServiceRequest;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::HttpMessage;
use tracing::{debug, warn};

use super::chain::{ChainFuture, Interceptor, Next};
use super::context::RequestContext;
use crate::auth::jwt::verify_access_token;
use crate::error::{AppError, AuthFailure};
use crate::state::security_config::SecurityConfig;

const BEARER_PREFIX: &str = "Bearer ";

/// The token from `Authorization: Bearer <token>`. The prefix is matched
/// literally; any other shape counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Verifies the bearer token and stores its claims in the request. Requests
/// without a valid token are answered with 401 and go no further.
#[derive(Debug, Clone)]
pub struct Authenticator {
    security: SecurityConfig,
}

impl Authenticator {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security }
    }
}

impl Interceptor for Authenticator {
    fn name(&self) -> &'static str {
        "authenticator"
    }

    fn intercept(&self, req: ServiceRequest, next: Next) -> ChainFuture {
        let verified = match bearer_token(req.headers()) {
            Some(token) => verify_access_token(token, &self.security),
            None => Err(AppError::unauthorized(AuthFailure::MissingBearer)),
        };

        match verified {
            Ok(claims) => {
                debug!(subject = %claims.sub, "token verified");
                {
                    let mut extensions = req.extensions_mut();
                    if let Some(ctx) = extensions.get_mut::<RequestContext>() {
                        ctx.set_subject(&claims.sub);
                    }
                    extensions.insert(claims);
                }
                next.call(req)
            }
            Err(err) => {
                warn!(code = %err.code(), "request rejected by authenticator");
                Box::pin(ready(Ok(req.error_response(err))))
            }
        }
    }
}
