use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde_json::Value;

use super::claims::Claims;
use super::claims::VerifiedClaims;
use super::errors::JwtError;
use crate::role::Role;
use crate::settings::TokenSettings;

/// JWT token handler for encoding and decoding identity tokens.
///
/// Stateless: holds only the signing keys, so one instance can be shared
/// across concurrent requests without locking.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key, signing with HS256.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_algorithm(secret, Algorithm::HS256)
    }

    /// Create a handler signing with an explicit HMAC algorithm.
    pub fn with_algorithm(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    /// Create a handler from process-wide token settings.
    pub fn from_settings(settings: &TokenSettings) -> Self {
        Self::with_algorithm(settings.secret(), settings.algorithm())
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a token for `subject` with `role`, valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry out of range or token encoding failed
    pub fn issue(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, JwtError> {
        let claims = Claims::for_identity(subject, role, ttl)
            .ok_or_else(|| JwtError::EncodingFailed("token expiry out of range".to_string()))?;

        self.encode(&claims)
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks run in a fixed order so the reported error is deterministic:
    /// 1. signature and structure (`InvalidSignature`)
    /// 2. expiry, `now >= exp` (`Expired`)
    /// 3. presence of `sub` and a known `role` (`MalformedClaims`)
    ///
    /// # Errors
    /// * `InvalidSignature` - Tampered, foreign-key or structurally broken token
    /// * `Expired` - Token validity window has elapsed
    /// * `MalformedClaims` - Subject or role missing or unreadable
    pub fn decode(&self, token: &str) -> Result<VerifiedClaims, JwtError> {
        let payload = self.verify_signature(token)?;

        let exp = match payload.get("exp") {
            Some(value) => value
                .as_i64()
                .ok_or_else(|| JwtError::MalformedClaims("exp is not a timestamp".to_string()))?,
            None => return Err(JwtError::MalformedClaims("missing exp".to_string())),
        };
        if Claims::new().with_expiration(exp).is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        let subject = payload
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| JwtError::MalformedClaims("missing sub".to_string()))?;

        let role = payload
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| JwtError::MalformedClaims("missing role".to_string()))?
            .parse::<Role>()
            .map_err(|e| JwtError::MalformedClaims(e.to_string()))?;

        Ok(VerifiedClaims {
            subject: subject.to_string(),
            role,
        })
    }

    /// Verify signature and return the raw payload.
    ///
    /// Registered-claim validation is switched off here; expiry is checked
    /// by `decode` after the signature so that ordering is under our control.
    fn verify_signature(&self, token: &str) -> Result<Value, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        decode::<Value>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| JwtError::InvalidSignature(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    /// Replace one character of the given token segment with a different one.
    fn flip_char(token: &str, segment: usize, position: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut chars: Vec<char> = parts[segment].chars().collect();
        chars[position] = if chars[position] == 'A' { 'B' } else { 'A' };
        parts[segment] = chars.into_iter().collect();
        parts.join(".")
    }

    #[test]
    fn test_issue_and_decode() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Role::Moderator, Duration::minutes(30))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let decoded = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(
            decoded,
            VerifiedClaims {
                subject: "alice".to_string(),
                role: Role::Moderator,
            }
        );
    }

    #[test]
    fn test_payload_wire_format() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .issue("alice", Role::User, Duration::minutes(30))
            .expect("Failed to issue token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        let payload = decode::<Value>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .expect("Failed to decode payload")
            .claims;

        assert_eq!(payload["sub"], "alice");
        assert_eq!(payload["role"], "user");
        assert!(payload["iat"].is_i64());
        assert_eq!(
            payload["exp"].as_i64().unwrap() - payload["iat"].as_i64().unwrap(),
            30 * 60
        );
    }

    #[test]
    fn test_issue_with_overflowing_ttl_fails() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.issue("alice", Role::User, Duration::minutes(1_000_000_000_000));
        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.decode("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .issue("alice", Role::Admin, Duration::minutes(30))
            .expect("Failed to issue token");

        let result = handler2.decode(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    }

    #[test]
    fn test_decode_with_wrong_algorithm() {
        let hs256 = JwtHandler::new(SECRET);
        let hs512 = JwtHandler::with_algorithm(SECRET, Algorithm::HS512);

        let token = hs512
            .issue("alice", Role::User, Duration::minutes(30))
            .expect("Failed to issue token");

        assert!(matches!(hs256.decode(&token), Err(JwtError::InvalidSignature(_))));
        assert!(hs512.decode(&token).is_ok());
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Role::User, Duration::seconds(-10))
            .expect("Failed to issue token");

        assert_eq!(handler.decode(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_decode_zero_ttl_is_expired() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Role::User, Duration::zero())
            .expect("Failed to issue token");

        assert_eq!(handler.decode(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_tampered_signature_reported_before_expiry() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Role::User, Duration::seconds(-3600))
            .expect("Failed to issue token");
        assert_eq!(handler.decode(&token), Err(JwtError::Expired));

        let tampered = flip_char(&token, 2, 0);
        assert!(matches!(
            handler.decode(&tampered),
            Err(JwtError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_tampered_payload_reported_before_expiry() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Role::User, Duration::seconds(-3600))
            .expect("Failed to issue token");

        let tampered = flip_char(&token, 1, 3);
        assert!(matches!(
            handler.decode(&tampered),
            Err(JwtError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_missing_role_is_malformed() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::new()
            .with_subject("alice")
            .with_issued_at(Utc::now().timestamp())
            .with_expiration(Utc::now().timestamp() + 600);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(matches!(
            handler.decode(&token),
            Err(JwtError::MalformedClaims(_))
        ));
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::new()
            .with_role(Role::Admin)
            .with_expiration(Utc::now().timestamp() + 600);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(matches!(
            handler.decode(&token),
            Err(JwtError::MalformedClaims(_))
        ));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::new().with_subject("alice").with_role(Role::User);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(matches!(
            handler.decode(&token),
            Err(JwtError::MalformedClaims(_))
        ));
    }

    #[test]
    fn test_expired_reported_before_missing_claims() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::new().with_expiration(Utc::now().timestamp() - 600);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert_eq!(handler.decode(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let handler = JwtHandler::new(SECRET);

        #[derive(serde::Serialize)]
        struct ForeignClaims {
            sub: &'static str,
            role: &'static str,
            exp: i64,
        }

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &ForeignClaims {
                sub: "mallory",
                role: "superuser",
                exp: Utc::now().timestamp() + 600,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(
            handler.decode(&token),
            Err(JwtError::MalformedClaims(_))
        ));
    }
}
