//! Boundaries to the external collaborators.
//!
//! Implementations are supplied explicitly by whoever wires the engine; the
//! engine never reaches for a process-wide registry.

use std::sync::Arc;

use async_trait::async_trait;

use tenantfence_auth::{Account, PrincipalId};
use tenantfence_core::{AccountId, Partition, PartitionId};

use crate::{DirectoryError, IdentityError, LookupError, TenantAssignment};

/// Maps a transport-level principal to an administrative account.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError>;
}

/// Queries the external authority for an account's partition assignment.
///
/// Implementations apply the `status = active` filter themselves and must
/// tolerate several active rows, returning the one with the highest
/// [`TenantAssignment::precedence`].
#[async_trait]
pub trait AssignmentLookup: Send + Sync {
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError>;
}

/// Read-only access to partition records.
#[async_trait]
pub trait PartitionDirectory: Send + Sync {
    async fn get_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError>;

    async fn list_partitions(&self) -> Result<Vec<Partition>, DirectoryError>;

    async fn default_partition(&self) -> Result<Option<Partition>, DirectoryError>;
}

#[async_trait]
impl<T> IdentityResolver for Arc<T>
where
    T: IdentityResolver + ?Sized,
{
    async fn resolve_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError> {
        (**self).resolve_account(principal).await
    }
}

#[async_trait]
impl<T> AssignmentLookup for Arc<T>
where
    T: AssignmentLookup + ?Sized,
{
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError> {
        (**self).find_active_assignment(account).await
    }
}

#[async_trait]
impl<T> PartitionDirectory for Arc<T>
where
    T: PartitionDirectory + ?Sized,
{
    async fn get_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError> {
        (**self).get_partition(id).await
    }

    async fn list_partitions(&self) -> Result<Vec<Partition>, DirectoryError> {
        (**self).list_partitions().await
    }

    async fn default_partition(&self) -> Result<Option<Partition>, DirectoryError> {
        (**self).default_partition().await
    }
}
