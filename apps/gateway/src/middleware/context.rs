//! Per-request context stored in request extensions by the request logger.

use actix_web::dev::Extensions;
use tracing::{info_span, warn, Span};

/// Correlation id, bound span and (once authenticated) subject of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub span: Span,
    pub subject: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: String, span: Span) -> Self {
        Self {
            request_id,
            span,
            subject: None,
        }
    }

    /// Record the authenticated subject on the context and its span.
    pub fn set_subject(&mut self, subject: &str) {
        self.span.record("subject", subject);
        self.subject = Some(subject.to_string());
    }
}

/// The span bound to this request, or a fresh default span when no request
/// logger ran. Never fails.
pub fn request_span(extensions: &Extensions) -> Span {
    match extensions.get::<RequestContext>() {
        Some(ctx) => ctx.span.clone(),
        None => {
            warn!("request context missing; using default span");
            info_span!("request", request_id = "unknown")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_span_when_context_absent() {
        let extensions = Extensions::new();
        // Must not panic with or without an active subscriber.
        let _span = request_span(&extensions);
    }

    #[test]
    fn stored_context_is_returned() {
        let mut extensions = Extensions::new();
        let mut ctx = RequestContext::new("req-1".into(), info_span!("request", subject = tracing::field::Empty));
        ctx.set_subject("user-1");
        extensions.insert(ctx);

        let stored = extensions.get::<RequestContext>().unwrap();
        assert_eq!(stored.request_id, "req-1");
        assert_eq!(stored.subject.as_deref(), Some("user-1"));
        let _span = request_span(&extensions);
    }
}
