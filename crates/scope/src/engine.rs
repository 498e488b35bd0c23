//! Scope Resolution Engine.
//!
//! The only place that turns a principal into an isolation decision.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use tenantfence_auth::PrincipalId;
use tenantfence_core::{Partition, PartitionId};

use crate::{
    AssignmentLookup, FailurePolicy, ForbiddenReason, IdentityResolver, PartitionDirectory,
    RequestScope, ScopeResolution,
};

/// Resolves principals to [`ScopeResolution`]s.
///
/// Pure read/compute: no writes, no caching of its own (wrap the
/// [`AssignmentLookup`] if caching is wanted). External failures never
/// propagate; they are logged and mapped through the [`FailurePolicy`].
pub struct ScopeResolver {
    identity: Arc<dyn IdentityResolver>,
    assignments: Arc<dyn AssignmentLookup>,
    directory: Arc<dyn PartitionDirectory>,
    policy: FailurePolicy,
}

impl ScopeResolver {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        assignments: Arc<dyn AssignmentLookup>,
        directory: Arc<dyn PartitionDirectory>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            identity,
            assignments,
            directory,
            policy,
        }
    }

    pub fn directory(&self) -> &dyn PartitionDirectory {
        self.directory.as_ref()
    }

    pub async fn resolve(&self, principal: PrincipalId) -> ScopeResolution {
        self.resolve_against(principal, None).await
    }

    /// Resolve `principal`, reusing `known` instead of fetching the assigned
    /// partition when it carries the same id.
    pub async fn resolve_against(
        &self,
        principal: PrincipalId,
        known: Option<&Partition>,
    ) -> ScopeResolution {
        match self.evaluate(principal, known, None).await {
            Ok(resolution) => resolution,
            Err(reason) => self.degrade(reason),
        }
    }

    /// Resolve the caller behind `scope`.
    ///
    /// `bound` is a partition a fresh session binding vouches for. When the
    /// live assignment still names it and the scope already holds it, the
    /// directory is not consulted at all. The assignment lookup always runs.
    ///
    /// A failed lookup under fail-open never widens a scope that already
    /// records a restriction: a denied scope or a restricted/forbidden
    /// session binding keeps that outcome instead of becoming unrestricted.
    pub async fn resolve_scope(
        &self,
        scope: &RequestScope,
        bound: Option<PartitionId>,
    ) -> ScopeResolution {
        let Some(principal) = scope.principal() else {
            return ScopeResolution::Unrestricted;
        };

        match self.evaluate(principal, scope.current_partition(), bound).await {
            Ok(resolution) => resolution,
            Err(reason) => match self.policy {
                FailurePolicy::FailClosed => ScopeResolution::Forbidden(reason),
                FailurePolicy::FailOpen => {
                    let fallback = scope.last_known_resolution(reason);
                    if !fallback.is_unrestricted() {
                        debug!(scope = fallback.label(), "keeping known restriction through outage");
                    }
                    fallback
                }
            },
        }
    }

    /// Resolution proper. `Err` carries the reason when the identity or
    /// assignment authority could not answer; the caller applies the policy.
    #[instrument(skip_all, fields(principal = %principal))]
    async fn evaluate(
        &self,
        principal: PrincipalId,
        known: Option<&Partition>,
        bound: Option<PartitionId>,
    ) -> Result<ScopeResolution, ForbiddenReason> {
        let account = match self.identity.resolve_account(principal).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!("no account bound to principal; unrestricted");
                return Ok(ScopeResolution::Unrestricted);
            }
            Err(err) => {
                warn!(error = %err, policy = %self.policy, "identity resolution failed");
                return Err(ForbiddenReason::IdentityUnavailable);
            }
        };

        let assignment = match self.assignments.find_active_assignment(account.id).await {
            Ok(Some(assignment)) if !assignment.is_active() => {
                debug!(account = %account.id, "lookup returned an inactive row; ignoring it");
                return Ok(ScopeResolution::Unrestricted);
            }
            Ok(Some(assignment)) if assignment.account_id != account.id => {
                warn!(
                    account = %account.id,
                    row_account = %assignment.account_id,
                    policy = %self.policy,
                    "assignment row belongs to a different account"
                );
                return Err(ForbiddenReason::LookupUnavailable);
            }
            Ok(Some(assignment)) => assignment,
            Ok(None) => {
                debug!(account = %account.id, "no active assignment; unrestricted");
                return Ok(ScopeResolution::Unrestricted);
            }
            Err(err) => {
                warn!(account = %account.id, error = %err, policy = %self.policy, "assignment lookup failed");
                return Err(ForbiddenReason::LookupUnavailable);
            }
        };

        let known = known.filter(|p| p.id == assignment.partition_id);
        if let Some(partition) = known.filter(|p| bound == Some(p.id) && !p.is_default) {
            debug!(account = %account.id, partition = %partition.id, "assignment confirms session binding");
            return Ok(ScopeResolution::RestrictedTo(partition.clone()));
        }

        match self.directory.default_partition().await {
            Ok(Some(default)) if default.id == assignment.partition_id => {
                warn!(account = %account.id, "account is assigned the default partition; forbidding");
                return Ok(ScopeResolution::Forbidden(ForbiddenReason::DefaultPartitionAssigned));
            }
            Ok(_) => {}
            // Fall through: the fetched partition's own flag still guards the default.
            Err(err) => warn!(error = %err, "default partition lookup failed during resolution"),
        }

        let partition = match known {
            Some(partition) => partition.clone(),
            None => match self.directory.get_partition(assignment.partition_id).await {
                Ok(Some(partition)) => partition,
                Ok(None) => {
                    warn!(
                        account = %account.id,
                        partition = %assignment.partition_id,
                        "assigned partition does not exist; forbidding"
                    );
                    return Ok(ScopeResolution::Forbidden(ForbiddenReason::PartitionNotFound));
                }
                Err(err) => {
                    warn!(
                        account = %account.id,
                        partition = %assignment.partition_id,
                        error = %err,
                        "assigned partition could not be read; forbidding"
                    );
                    return Ok(ScopeResolution::Forbidden(ForbiddenReason::PartitionUnavailable));
                }
            },
        };

        if partition.is_default {
            warn!(account = %account.id, "assigned partition is flagged default; forbidding");
            return Ok(ScopeResolution::Forbidden(ForbiddenReason::DefaultPartitionAssigned));
        }

        debug!(account = %account.id, partition = %partition.id, "restricted");
        Ok(ScopeResolution::RestrictedTo(partition))
    }

    fn degrade(&self, reason: ForbiddenReason) -> ScopeResolution {
        match self.policy {
            FailurePolicy::FailOpen => ScopeResolution::Unrestricted,
            FailurePolicy::FailClosed => ScopeResolution::Forbidden(reason),
        }
    }
}
