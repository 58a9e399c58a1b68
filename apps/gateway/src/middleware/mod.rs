pub mod auth;
pub mod chain;
pub mod context;
pub mod rate_limit;
pub mod request_logger;

use std::sync::Arc;

pub use auth::Authenticator;
pub use chain::{Chain, ChainFuture, Interceptor, Next};
pub use context::{request_span, RequestContext};
pub use rate_limit::{Admission, RateLimiter, TokenBucket};
pub use request_logger::RequestLogger;

use crate::state::security_config::SecurityConfig;

/// Chain for public routes: logging only.
pub fn public_chain() -> Chain {
    Chain::new().with(RequestLogger)
}

/// Chain for protected routes. The logger is outermost so rejected requests
/// are still logged with their final status.
pub fn protected_chain(security: SecurityConfig, bucket: Arc<TokenBucket>) -> Chain {
    Chain::new()
        .with(RequestLogger)
        .with(Authenticator::new(security))
        .with(RateLimiter::new(bucket))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn protected_chain_order() {
        let chain = protected_chain(
            SecurityConfig::new("secret", Duration::from_secs(60)),
            Arc::new(TokenBucket::new(1, Duration::from_secs(1))),
        );
        assert_eq!(
            chain.names(),
            vec!["request_logger", "authenticator", "rate_limiter"]
        );
        assert_eq!(public_chain().names(), vec!["request_logger"]);
    }
}
