use thiserror::Error;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::role::Role;
use crate::settings::TokenSettings;

/// Authenticated caller.
///
/// Only [`AccessGuard::authenticate`] creates values of this type, so holding
/// one means a token was verified for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
    role: Role,
}

impl Identity {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Request-boundary access errors.
///
/// Token decode failures are collapsed into `Unauthorized`; the specific
/// reason is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Not enough permissions")]
    Forbidden { required: Role, actual: Role },
}

/// Per-request authentication and role gate.
pub struct AccessGuard {
    jwt_handler: JwtHandler,
}

impl AccessGuard {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            jwt_handler: JwtHandler::from_settings(settings),
        }
    }

    /// Turn a raw bearer token into an [`Identity`].
    ///
    /// # Errors
    /// * `Unauthorized` - Token tampered, expired or missing claims
    pub fn authenticate(&self, raw_token: &str) -> Result<Identity, AccessError> {
        match self.jwt_handler.decode(raw_token) {
            Ok(claims) => Ok(Identity {
                subject: claims.subject,
                role: claims.role,
            }),
            Err(e) => {
                match &e {
                    JwtError::InvalidSignature(_) => {
                        tracing::warn!(reason = "invalid_signature", error = %e, "Token rejected")
                    }
                    JwtError::Expired => {
                        tracing::warn!(reason = "expired", "Token rejected")
                    }
                    JwtError::MalformedClaims(_) | JwtError::EncodingFailed(_) => {
                        tracing::warn!(reason = "malformed_claims", error = %e, "Token rejected")
                    }
                }
                Err(AccessError::Unauthorized)
            }
        }
    }

    /// Admit `identity` if its role satisfies `required`.
    ///
    /// # Errors
    /// * `Forbidden` - Role is neither `required` nor admin
    pub fn require_role(&self, identity: Identity, required: Role) -> Result<Identity, AccessError> {
        if identity.role.satisfies(required) {
            Ok(identity)
        } else {
            tracing::warn!(
                subject = %identity.subject,
                role = %identity.role,
                required = %required,
                "Role check failed"
            );
            Err(AccessError::Forbidden {
                required,
                actual: identity.role,
            })
        }
    }
}
