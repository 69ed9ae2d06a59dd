use chrono::Duration;
use jsonwebtoken::Algorithm;

/// Immutable token configuration.
///
/// Built once at process start and handed to [`Authenticator`](crate::Authenticator)
/// and [`AccessGuard`](crate::AccessGuard).
#[derive(Clone)]
pub struct TokenSettings {
    secret: Vec<u8>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenSettings {
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Create settings with HS256 and the default 30 minute TTL.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}
