use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::config::JwtConfig;

/// Issuer stamped into and required on every access token
pub const TOKEN_ISSUER: &str = "go-serve";
/// Audience stamped into and required on every access token
pub const TOKEN_AUDIENCE: &str = "web";

/// Configuration for JWT security settings
#[derive(Clone)]
pub struct SecurityConfig {
    /// Shared HMAC secret for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// Algorithm used when minting (verification accepts the HMAC family)
    pub algorithm: Algorithm,
    /// Lifetime of a freshly minted token
    pub token_ttl: Duration,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>, token_ttl: Duration) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl,
        }
    }
}

impl From<&JwtConfig> for SecurityConfig {
    fn from(cfg: &JwtConfig) -> Self {
        Self::new(cfg.secret.as_bytes().to_vec(), cfg.expiration)
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_secret() {
        let sec = SecurityConfig::new("very-secret-bytes", Duration::from_secs(60));
        let dbg = format!("{sec:?}");
        assert!(!dbg.contains("very-secret-bytes"));
        assert!(dbg.contains("HS256"));
    }
}
