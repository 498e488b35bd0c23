//! In-crate fakes for the three ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use tenantfence_auth::{Account, PrincipalId};
use tenantfence_core::{AccountId, Partition, PartitionId};

use crate::{
    AssignmentLookup, DirectoryError, FailurePolicy, IdentityError, IdentityResolver, LookupError,
    PartitionDirectory, ScopeResolver, TenantAssignment,
};

pub(crate) const DEFAULT: PartitionId = PartitionId::new(1);
pub(crate) const SEVEN: PartitionId = PartitionId::new(7);
pub(crate) const EIGHT: PartitionId = PartitionId::new(8);

pub(crate) fn partition(id: PartitionId, is_default: bool) -> Partition {
    Partition {
        id,
        code: format!("p{}", id),
        token: format!("tok-{}", id),
        locale: "en_US".to_string(),
        currency: "USD".to_string(),
        is_default,
    }
}

#[derive(Default)]
pub(crate) struct World {
    accounts: Mutex<HashMap<PrincipalId, Account>>,
    assignments: Mutex<HashMap<AccountId, TenantAssignment>>,
    partitions: Mutex<Vec<Partition>>,
    pub lookup_down: AtomicBool,
    pub identity_down: AtomicBool,
    pub directory_down: AtomicBool,
    pub partition_fetches: AtomicUsize,
    pub default_reads: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl World {
    /// Partitions 1 (default), 7 and 8.
    pub fn standard() -> Arc<Self> {
        let world = Self::default();
        *world.partitions.lock().unwrap() = vec![
            partition(DEFAULT, true),
            partition(SEVEN, false),
            partition(EIGHT, false),
        ];
        Arc::new(world)
    }

    pub fn account(&self, id: i64) -> PrincipalId {
        let principal = PrincipalId::new();
        self.accounts.lock().unwrap().insert(
            principal,
            Account {
                id: AccountId::new(id),
                principal_id: principal,
                contact: format!("admin{id}@example.test"),
            },
        );
        principal
    }

    pub fn assign(&self, account: i64, partition: PartitionId) {
        let account = AccountId::new(account);
        self.assignments
            .lock()
            .unwrap()
            .insert(account, TenantAssignment::active(account, partition, Utc::now()));
    }

    pub fn all_partitions(&self) -> Vec<Partition> {
        self.partitions.lock().unwrap().clone()
    }

    pub fn resolver(self: &Arc<Self>, policy: FailurePolicy) -> Arc<ScopeResolver> {
        Arc::new(ScopeResolver::new(
            self.clone(),
            self.clone(),
            self.clone(),
            policy,
        ))
    }
}

#[async_trait]
impl IdentityResolver for World {
    async fn resolve_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError> {
        if self.identity_down.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("identity down".into()));
        }
        Ok(self.accounts.lock().unwrap().get(&principal).cloned())
    }
}

#[async_trait]
impl AssignmentLookup for World {
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.lookup_down.load(Ordering::SeqCst) {
            return Err(LookupError::Unavailable("authority down".into()));
        }
        Ok(self.assignments.lock().unwrap().get(&account).cloned())
    }
}

#[async_trait]
impl PartitionDirectory for World {
    async fn get_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError> {
        self.partition_fetches.fetch_add(1, Ordering::SeqCst);
        if self.directory_down.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("directory down".into()));
        }
        Ok(self.partitions.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_partitions(&self) -> Result<Vec<Partition>, DirectoryError> {
        if self.directory_down.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("directory down".into()));
        }
        Ok(self.all_partitions())
    }

    async fn default_partition(&self) -> Result<Option<Partition>, DirectoryError> {
        self.default_reads.fetch_add(1, Ordering::SeqCst);
        if self.directory_down.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("directory down".into()));
        }
        Ok(self.partitions.lock().unwrap().iter().find(|p| p.is_default).cloned())
    }
}
