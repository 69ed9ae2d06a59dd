use thiserror::Error;

/// Error type for password operations.
///
/// Verification never fails: a mismatch or an unparseable digest is reported
/// as `false` by [`PasswordHasher::verify`](super::PasswordHasher::verify).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password could not be encoded for hashing: {0}")]
    Encoding(String),
}
