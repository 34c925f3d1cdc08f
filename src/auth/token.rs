// ==============================================================================
// auth/token.rs - Bearer Token Issuance & Verification
// ==============================================================================
// Description: HS256 signed tokens binding a user identifier to an expiry
// Author: Matt Barham
// Created: 2026-07-28
// Modified: 2026-08-02
// Version: 1.0.0
// ==============================================================================
//
// Security: Tokens are verified, never decoded-and-trusted. The signature is
// checked against the configured secret and the embedded expiry is enforced
// by the decoder. There is no revocation mechanism; a token is valid until
// its expiry passes.
//
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Claim set embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id (UUID string)
    pub sub: String,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Verification failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

/// Handler for token operations
pub struct TokenHandler {
    secret: String,
    ttl_hours: i64,
}

impl TokenHandler {
    /// Create a new token handler with the signing secret
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self { secret, ttl_hours }
    }

    /// Issue a token for a user, returning the token and its lifetime in seconds
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<(String, i64)> {
        self.issue_at(Utc::now(), user_id, email)
    }

    pub(crate) fn issue_at(
        &self,
        now: DateTime<Utc>,
        user_id: Uuid,
        email: &str,
    ) -> Result<(String, i64)> {
        let iat = now.timestamp();
        let exp = now
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .context("Invalid expiry timestamp")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat,
            exp,
        };

        debug!(
            "Issuing token for user {} ({}), expires in {}h",
            user_id, email, self.ttl_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to encode token")?;

        Ok((token, self.ttl_hours * 3600))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// `ErrorKind::ExpiredSignature` surfaces as `TokenError::Expired`; every
    /// other decode failure (bad signature, malformed structure) collapses to
    /// `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}
