use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::role::Role;

/// Identity token claims.
///
/// Wire form: `{"sub": .., "role": "admin"|"moderator"|"user", "iat": .., "exp": ..}`
/// with numeric timestamps in seconds. Fields are optional so that partially
/// populated tokens can be built and inspected; [`JwtHandler::decode`]
/// insists on all of them.
///
/// [`JwtHandler::decode`]: super::JwtHandler::decode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (credential identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Role snapshot taken at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for an identity, issued now and expiring after `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Credential identifier
    /// * `role` - Role at issuance time
    /// * `ttl` - Validity window
    ///
    /// Returns `None` when `now + ttl` falls outside the representable range.
    pub fn for_identity(subject: impl ToString, role: Role, ttl: Duration) -> Option<Self> {
        let now = Utc::now();
        let expiration = now.checked_add_signed(ttl)?;

        Some(Self {
            sub: Some(subject.to_string()),
            role: Some(role),
            iat: Some(now.timestamp()),
            exp: Some(expiration.timestamp()),
        })
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the second named by `exp` onwards. Claims
    /// without `exp` are treated as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(true, |exp| current_timestamp >= exp)
    }
}

/// Claims that passed signature, expiry and presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub role: Role,
}
