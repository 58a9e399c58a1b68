//! Request logger interceptor.
//!
//! Reads `X-Request-ID` (or generates a UUID), opens a `request` span carrying
//! the correlation id, method, path and remote address, and runs everything
//! further in the chain inside that span and inside the task-local request
//! context. Emits one `request_completed` entry per request with the final
//! status and elapsed time, and echoes the id in the response.

use std::time::Instant;

use actix_web::dev::ServiceRequest;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpMessage;
use tracing::{error, field, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::chain::{ChainFuture, Interceptor, Next};
use super::context::RequestContext;
use crate::trace_ctx;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound correlation id accepted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

fn inbound_request_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_owned)
}

impl Interceptor for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    fn intercept(&self, req: ServiceRequest, next: Next) -> ChainFuture {
        let start = Instant::now();
        let request_id = inbound_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
            remote_addr = %remote_addr,
            subject = field::Empty,
        );

        req.extensions_mut()
            .insert(RequestContext::new(request_id.clone(), span.clone()));

        let header_value = HeaderValue::from_str(&request_id).ok();
        let handle = async move {
            let result = next.call(req).await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            let status_code = status.as_u16();
            let duration_us = start.elapsed().as_micros() as u64;

            if status.is_server_error() {
                error!(http.status_code = status_code, duration_us, "request_completed");
            } else if status.is_client_error() {
                warn!(http.status_code = status_code, duration_us, "request_completed");
            } else {
                info!(http.status_code = status_code, duration_us, "request_completed");
            }

            result.map(|mut res| {
                if let Some(value) = header_value {
                    res.headers_mut()
                        .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                }
                res
            })
        };

        Box::pin(trace_ctx::with_request_id(request_id, handle.instrument(span)))
    }
}
