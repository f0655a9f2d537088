//! # Authentication Gate
//!
//! Turns the raw `Authorization` header into a verified [`Identity`].
//! Transport layers call [`authenticate`] and attach the identity to the
//! request; nothing here holds state between calls.

use crate::error::ShopError;
use crate::token::{Identity, TokenError, TokenService};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header at all
    #[error("No token provided")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization format")]
    InvalidFormat,

    /// Token failed verification
    #[error("Invalid or expired token")]
    InvalidToken(#[from] TokenError),
}

impl From<AuthError> for ShopError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ShopError::Forbidden(err.to_string()),
            // signature, expiry and shape failures share one message
            AuthError::InvalidFormat | AuthError::InvalidToken(_) => {
                ShopError::Unauthorized(err.to_string())
            }
        }
    }
}

/// Verify an `Authorization` header value
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<Identity, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.contains(' '))
        .ok_or(AuthError::InvalidFormat)?;

    Ok(tokens.verify(token)?)
}
