//! Login-time Scope Binder.
//!
//! Resolves once when a session is established and stamps the outcome into
//! the session credentials. Purely an optimization: enforcement and the
//! visibility filter produce the same answers without it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use tenantfence_auth::{JwtClaims, PrincipalId, ScopeBinding};

use crate::ScopeResolver;

pub struct LoginBinder {
    resolver: Arc<ScopeResolver>,
}

impl LoginBinder {
    pub fn new(resolver: Arc<ScopeResolver>) -> Self {
        Self { resolver }
    }

    pub async fn bind(&self, principal: PrincipalId, now: DateTime<Utc>) -> ScopeBinding {
        let resolution = self.resolver.resolve(principal).await;
        info!(principal = %principal, scope = resolution.label(), "bound session scope");
        ScopeBinding::new(resolution.binding_class(), now)
    }

    /// Claims for a re-issued session token carrying a fresh binding.
    ///
    /// A restricted binding also pins the token's selected partition so the
    /// next request starts on the right partition. The validity window is
    /// copied unchanged: rebinding never extends a session.
    pub async fn bind_claims(&self, claims: &JwtClaims, now: DateTime<Utc>) -> JwtClaims {
        let binding = self.bind(claims.sub, now).await;
        JwtClaims {
            partition_id: binding.restricted_partition().or(claims.partition_id),
            scope: Some(binding),
            ..claims.clone()
        }
    }
}
