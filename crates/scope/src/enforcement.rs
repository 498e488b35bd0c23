//! Scope Enforcement: rewrites the request scope once per request.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};

use crate::{RequestScope, ScopeResolution, ScopeResolver};

pub struct ScopeEnforcer {
    resolver: Arc<ScopeResolver>,
    binding_ttl: Duration,
}

impl ScopeEnforcer {
    pub fn new(resolver: Arc<ScopeResolver>, binding_ttl: Duration) -> Self {
        Self {
            resolver,
            binding_ttl,
        }
    }

    pub async fn enforce(&self, scope: &RequestScope) -> RequestScope {
        self.enforce_at(scope, Utc::now()).await
    }

    /// Compute the replacement for `scope`.
    ///
    /// Never fails: resolution already folds external failures into the
    /// configured policy, so the worst case is returning `scope` unchanged.
    /// Calling this on its own output yields the same value.
    ///
    /// A fresh restricted session binding that matches the slot lets the
    /// resolver skip the directory, but the assignment is still looked up:
    /// a reassignment takes effect on the next request, binding or not.
    #[instrument(skip_all, fields(partition = ?scope.partition_id()))]
    pub async fn enforce_at(&self, scope: &RequestScope, now: DateTime<Utc>) -> RequestScope {
        if scope.principal().is_none() {
            return scope.clone();
        }

        let bound = scope
            .session()
            .filter(|binding| binding.is_fresh(now, self.binding_ttl))
            .and_then(|binding| binding.restricted_partition())
            .filter(|id| scope.partition_id() == Some(*id));

        match self.resolver.resolve_scope(scope, bound).await {
            ScopeResolution::Unrestricted => scope.clone(),
            ScopeResolution::RestrictedTo(partition) => {
                if scope.partition_id() == Some(partition.id) {
                    scope.clone()
                } else {
                    debug!(to = %partition.id, "confining request to assigned partition");
                    scope.confined_to(partition)
                }
            }
            ScopeResolution::Forbidden(reason) => {
                debug!(?reason, "request has no accessible partition");
                scope.denied()
            }
        }
    }
}
