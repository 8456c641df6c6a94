//! Bearer token issue and verification (HS256 JWT).
//!
//! The subject is the user's canonical id; tokens expire 24 hours after
//! issue. Expiry and malformed-signature failures map to distinct auth
//! outcomes; any other verification fault is a server fault, not an auth
//! decision.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{AuthFailure, DomainError};

pub const TOKEN_TYPE: &str = "Bearer";
pub const EXPIRES_IN: &str = "24h";
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Canonical user id
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Sign a fresh token for the given user id.
pub fn issue(user_id: &str, secret: &str) -> Result<String, DomainError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| DomainError::Storage(anyhow!("token signing failed: {}", e)))
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims, DomainError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(DomainError::Auth(AuthFailure::TokenExpired)),
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Err(DomainError::Auth(AuthFailure::TokenInvalid)),
            _ => Err(DomainError::Storage(anyhow!(
                "token verification fault: {}",
                e
            ))),
        },
    }
}
