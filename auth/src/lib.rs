//! Authentication and authorization library
//!
//! Provides the identity core shared by the HTTP service:
//! - Password hashing (Argon2id)
//! - Signed, expiring identity tokens (JWT)
//! - Credential verification and token issuance
//! - Per-request token authentication and role gating
//!
//! Storage stays outside this crate: services look credential records up
//! themselves and hand the stored digest and role to [`Authenticator`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Login and Guarded Access
//! ```
//! use auth::{AccessGuard, Authenticator, Role, TokenSettings};
//!
//! let settings = TokenSettings::new("secret_key_at_least_32_bytes_long!");
//! let authenticator = Authenticator::new(&settings);
//! let guard = AccessGuard::new(&settings);
//!
//! // Register: hash password
//! let hash = authenticator.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = authenticator
//!     .authenticate("password123", &hash, "alice", Role::Moderator)
//!     .unwrap();
//!
//! // Guard: authenticate the bearer token, then check the role
//! let identity = guard.authenticate(&result.access_token).unwrap();
//! assert!(guard.require_role(identity.clone(), Role::Moderator).is_ok());
//! assert!(guard.require_role(identity, Role::Admin).is_err());
//! ```

pub mod authenticator;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod role;
pub mod settings;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use guard::AccessError;
pub use guard::AccessGuard;
pub use guard::Identity;
pub use jsonwebtoken::Algorithm;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::VerifiedClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::RoleParseError;
pub use settings::TokenSettings;
