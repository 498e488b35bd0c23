use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use tenantfence_auth::{Account, PrincipalId};
use tenantfence_core::{AccountId, Partition, PartitionId};
use tenantfence_scope::{
    AssignmentLookup, AssignmentStatus, DirectoryError, IdentityError, IdentityResolver,
    LookupError, PartitionDirectory, TenantAssignment,
};

/// In-memory identity store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<HashMap<PrincipalId, Account>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(account.principal_id, account);
        }
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityStore {
    async fn resolve_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError> {
        let map = self
            .inner
            .read()
            .map_err(|_| IdentityError::Unavailable("identity store lock poisoned".to_string()))?;
        Ok(map.get(&principal).cloned())
    }
}

/// In-memory tenant assignment table.
///
/// Keeps every row, active or not, so that data-integrity conditions like
/// several active rows for one account can be reproduced. Can be flipped
/// into an unavailable state to simulate an authority outage.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    rows: RwLock<Vec<TenantAssignment>>,
    unavailable: AtomicBool,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, row: TenantAssignment) {
        if let Ok(mut rows) = self.rows.write() {
            rows.push(row);
        }
    }

    /// Set the status of every row binding `account` to `partition`.
    pub fn set_status(&self, account: AccountId, partition: PartitionId, status: AssignmentStatus) {
        if let Ok(mut rows) = self.rows.write() {
            rows.iter_mut()
                .filter(|r| r.account_id == account && r.partition_id == partition)
                .for_each(|r| r.status = status);
        }
    }

    pub fn clear_account(&self, account: AccountId) {
        if let Ok(mut rows) = self.rows.write() {
            rows.retain(|r| r.account_id != account);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssignmentLookup for InMemoryAssignmentStore {
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LookupError::Unavailable("assignment store offline".to_string()));
        }
        let rows = self
            .rows
            .read()
            .map_err(|_| LookupError::Unavailable("assignment store lock poisoned".to_string()))?;

        Ok(rows
            .iter()
            .filter(|r| r.account_id == account && r.is_active())
            .max_by_key(|r| r.precedence())
            .cloned())
    }
}

/// In-memory partition directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPartitionDirectory {
    inner: RwLock<BTreeMap<PartitionId, Partition>>,
}

impl InMemoryPartitionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partitions(partitions: impl IntoIterator<Item = Partition>) -> Self {
        let directory = Self::new();
        for partition in partitions {
            directory.upsert(partition);
        }
        directory
    }

    pub fn upsert(&self, partition: Partition) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(partition.id, partition);
        }
    }

    pub fn remove(&self, id: PartitionId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&id);
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<PartitionId, Partition>>, DirectoryError> {
        self.inner
            .read()
            .map_err(|_| DirectoryError::Unavailable("partition directory lock poisoned".to_string()))
    }
}

#[async_trait]
impl PartitionDirectory for InMemoryPartitionDirectory {
    async fn get_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list_partitions(&self) -> Result<Vec<Partition>, DirectoryError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn default_partition(&self) -> Result<Option<Partition>, DirectoryError> {
        Ok(self.read()?.values().find(|p| p.is_default).cloned())
    }
}
