use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantfence_core::PartitionId;

use crate::{PrincipalId, Role, ScopeBinding};

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims expected once a token has been decoded and
/// verified by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Roles granted to the principal. Carried, never interpreted here.
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Partition the issuing front end selected for this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<PartitionId>,

    /// Scope outcome bound at login, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeBinding>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Validates the claims only; signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
