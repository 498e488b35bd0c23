//! Partition Visibility Filter.
//!
//! Shapes the two partition read operations ("list partitions" and "get
//! current partition") by the same resolution the enforcer uses. It does not
//! trust a previous enforcement pass: each call resolves afresh, reusing the
//! scope's partition only when the fresh answer names the same id. When the
//! fresh answer is unavailable, a restriction the scope already records is
//! kept rather than widened to the default partition.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use tenantfence_core::Partition;

use crate::{RequestScope, ScopeError, ScopeResolution, ScopeResolver};

/// Answer to "which partition is current for this request".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentPartition {
    /// A restricted caller's assigned partition.
    Assigned(Partition),
    /// Unrestricted or anonymous caller; the partition already in the scope.
    Scoped(Partition),
    /// Unrestricted or anonymous caller with nothing in the scope.
    Default(Partition),
    /// Forbidden caller: nothing is current, and never the default.
    NoAccess,
}

impl CurrentPartition {
    pub fn partition(&self) -> Option<&Partition> {
        match self {
            Self::Assigned(p) | Self::Scoped(p) | Self::Default(p) => Some(p),
            Self::NoAccess => None,
        }
    }

    pub fn into_partition(self) -> Option<Partition> {
        match self {
            Self::Assigned(p) | Self::Scoped(p) | Self::Default(p) => Some(p),
            Self::NoAccess => None,
        }
    }
}

pub struct PartitionVisibility {
    resolver: Arc<ScopeResolver>,
}

impl PartitionVisibility {
    pub fn new(resolver: Arc<ScopeResolver>) -> Self {
        Self { resolver }
    }

    async fn resolve(&self, scope: &RequestScope) -> ScopeResolution {
        self.resolver.resolve_scope(scope, None).await
    }

    /// Partitions visible to the caller.
    ///
    /// Directory failures while listing for an unrestricted caller are logged
    /// and yield an empty list; listing never fails the request.
    #[instrument(skip_all, fields(partition = ?scope.partition_id()))]
    pub async fn list_partitions(&self, scope: &RequestScope) -> Vec<Partition> {
        match self.resolve(scope).await {
            ScopeResolution::Unrestricted => match self.resolver.directory().list_partitions().await {
                Ok(partitions) => partitions,
                Err(err) => {
                    warn!(error = %err, "partition listing failed");
                    Vec::new()
                }
            },
            ScopeResolution::RestrictedTo(partition) if partition.is_default => {
                warn!("restricted resolution named the default partition; hiding it");
                Vec::new()
            }
            ScopeResolution::RestrictedTo(partition) => vec![partition],
            ScopeResolution::Forbidden(_) => Vec::new(),
        }
    }

    /// The partition current for the caller.
    ///
    /// Only fails when an unrestricted or anonymous caller needs the default
    /// partition and it cannot be located.
    #[instrument(skip_all, fields(partition = ?scope.partition_id()))]
    pub async fn current_partition(&self, scope: &RequestScope) -> Result<CurrentPartition, ScopeError> {
        match self.resolve(scope).await {
            ScopeResolution::RestrictedTo(partition) => {
                if scope.partition_id() == Some(partition.id) {
                    debug!(path = "use_cached_scope", "current partition confirmed");
                } else {
                    debug!(path = "resolve_fresh", "current partition resolved");
                }
                Ok(CurrentPartition::Assigned(partition))
            }
            ScopeResolution::Forbidden(reason) => {
                debug!(?reason, "caller has no current partition");
                Ok(CurrentPartition::NoAccess)
            }
            ScopeResolution::Unrestricted => match scope.current_partition() {
                Some(partition) => Ok(CurrentPartition::Scoped(partition.clone())),
                None => self.default_partition().await.map(CurrentPartition::Default),
            },
        }
    }

    async fn default_partition(&self) -> Result<Partition, ScopeError> {
        match self.resolver.directory().default_partition().await {
            Ok(Some(partition)) => Ok(partition),
            Ok(None) => {
                error!("no default partition is configured");
                Err(ScopeError::DefaultPartitionUnavailable)
            }
            Err(err) => {
                error!(error = %err, "default partition lookup failed");
                Err(ScopeError::DefaultPartitionUnavailable)
            }
        }
    }
}
