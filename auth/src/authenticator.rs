use std::sync::OnceLock;

use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::role::Role;
use crate::settings::TokenSettings;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Storage-agnostic: callers look the credential record up and hand over the
/// stored digest and role. Failed lookups go through [`Authenticator::reject`]
/// so that an unknown identifier costs the same hashing work as a wrong password.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
    decoy_hash: OnceLock<Option<String>>,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `settings` - Process-wide token settings (key, algorithm, TTL)
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::from_settings(settings),
            token_ttl: settings.ttl(),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Validity window applied to every issued token.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and generate a JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identifier to embed as `sub`
    /// * `role` - Current role of the record, embedded as a snapshot
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match or hash is unreadable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        role: Role,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(subject, role)?;

        Ok(AuthenticationResult {
            access_token,
            expires_in: self.token_ttl.num_seconds(),
        })
    }

    /// Burn one password verification and return `InvalidCredentials`.
    ///
    /// Used when no record matched the identifier, or the record may not log in.
    pub fn reject(&self, password: &str) -> AuthenticationError {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.password_hasher.hash("decoy-password").ok());

        if let Some(decoy) = decoy {
            let _ = self.password_hasher.verify(password, decoy);
        }

        AuthenticationError::InvalidCredentials
    }

    /// Generate a JWT token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, subject: &str, role: Role) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject, role, self.token_ttl)
    }
}
