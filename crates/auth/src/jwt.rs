//! HS256 token verification and issuing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unverifiable token: {0}")]
    Decode(String),

    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret (HS256) validator.
///
/// Expiry is checked by [`validate_claims`] against the RFC 3339 timestamps in
/// the claims, so the library's numeric `exp` handling is switched off.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| JwtError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Shared-secret (HS256) issuer, used when re-issuing session tokens.
pub struct Hs256JwtIssuer {
    key: EncodingKey,
}

impl Hs256JwtIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }
}
