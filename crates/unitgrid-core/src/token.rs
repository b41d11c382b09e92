//! Bearer token issuance
//!
//! Every successful enrollment mints a new token bound to the unit's
//! identity. The directory only depends on the [`TokenIssuer`] trait so a
//! deterministic or failing signer can be substituted in tests.
//!
//! [`JwtIssuer`] produces HS256 JWTs carrying:
//! - `sub`: the unit identity
//! - `authorized`: always `true`
//! - `iat` / `exp`: issuance time and expiry (Unix seconds)
//! - `jti`: a fresh UUIDv4, so two tokens issued in the same second differ

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::Unit;

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Longest accepted token lifetime (10 years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 86_400;

/// Error raised by a token issuer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No signing key is configured
    #[error("token signing key unavailable")]
    KeyUnavailable,

    /// The signer failed to produce a token
    #[error("token signing failed: {0}")]
    Signing(String),

    /// A presented token failed verification
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by an issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unit identity the token is bound to
    pub sub: String,
    pub authorized: bool,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Mints bearer credentials for units
pub trait TokenIssuer: Send + Sync {
    /// Issue a fresh token for `unit`
    ///
    /// Implementations must never return a previously issued token.
    fn issue(&self, unit: &Unit) -> Result<String, TokenError>;
}

/// HS256 JWT issuer backed by a shared secret
#[derive(Clone)]
pub struct JwtIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("secret", &"[redacted]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtIssuer {
    /// Create an issuer with the default lifetime
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Override the token lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::KeyUnavailable);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if !data.claims.authorized {
            return Err(TokenError::Invalid("token is not authorized".into()));
        }

        Ok(data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, unit: &Unit) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::KeyUnavailable);
        }

        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".into()))?;

        let claims = TokenClaims {
            sub: unit.identity.clone(),
            authorized: true,
            iat: now.timestamp(),
            exp: expires.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
