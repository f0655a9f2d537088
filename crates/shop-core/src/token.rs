//! # Token Service
//!
//! Issues and verifies the signed identity assertion (HS256 JWT) carried in
//! `Authorization: Bearer <token>`. The signing key is handed in at
//! construction; swapping the key invalidates every outstanding token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default lifetime of an issued token
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Verified customer identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub customer_id: i32,
    pub name: String,
    pub email: String,
}

/// Claims encoded in the token: the identity plus issue/expiry times
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    customer_id: i32,
    name: String,
    email: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Issues and verifies identity tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    /// Builder: override the token lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid from now for the configured lifetime
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            customer_id: identity.customer_id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            iat: issued_at.timestamp().max(0) as u64,
            exp: (issued_at + self.ttl).timestamp().max(0) as u64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the encoded identity
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!("token rejected: {e}");
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(Identity {
            customer_id: data.claims.customer_id,
            name: data.claims.name,
            email: data.claims.email,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn johndoe() -> Identity {
        Identity {
            customer_id: 1,
            name: "johndoe".into(),
            email: "jd@mail.com".into(),
        }
    }

    #[test]
    fn test_round_trip_identity() {
        let tokens = TokenService::new(b"test-key");
        let token = tokens.issue(&johndoe()).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), johndoe());
    }

    #[test]
    fn test_different_key_is_rejected() {
        let token = TokenService::new(b"key-one").issue(&johndoe()).unwrap();
        let err = TokenService::new(b"key-two").verify(&token).unwrap_err();

        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(b"test-key");
        let token = tokens
            .issue_at(&johndoe(), Utc::now() - Duration::hours(25))
            .unwrap();

        assert_eq!(tokens.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_token_valid_just_inside_ttl() {
        let tokens = TokenService::new(b"test-key");
        let token = tokens
            .issue_at(&johndoe(), Utc::now() - Duration::hours(23))
            .unwrap();

        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = TokenService::new(b"test-key");
        assert_eq!(
            tokens.verify("invalid token ;)").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_default_ttl_is_24_hours() {
        assert_eq!(TokenService::new(b"k").ttl(), Duration::hours(24));
    }
}
