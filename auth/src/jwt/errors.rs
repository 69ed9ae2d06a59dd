use thiserror::Error;

/// Error type for JWT operations.
///
/// Decode failures are reported in check order: signature, then expiry,
/// then claim presence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid: {0}")]
    InvalidSignature(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token claims are malformed: {0}")]
    MalformedClaims(String),
}
