//! TTL-bounded assignment cache.
//!
//! The external assignment store can reassign a tenant without telling us,
//! so cached answers carry a short TTL and can be dropped explicitly through
//! [`CachedAssignmentLookup::invalidate`]. Failed lookups are never cached.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use tenantfence_core::AccountId;
use tenantfence_scope::{AssignmentLookup, LookupError, TenantAssignment};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Option<TenantAssignment>,
    stored_at: Instant,
}

/// Decorates any [`AssignmentLookup`] with a per-account TTL cache.
#[derive(Debug)]
pub struct CachedAssignmentLookup<L> {
    inner: L,
    ttl: Duration,
    entries: RwLock<HashMap<AccountId, CacheEntry>>,
}

impl<L> CachedAssignmentLookup<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached answer for one account.
    pub fn invalidate(&self, account: AccountId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&account);
        }
    }

    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn fresh(&self, account: AccountId, now: Instant) -> Option<Option<TenantAssignment>> {
        let entries = self.entries.read().ok()?;
        entries
            .get(&account)
            .filter(|e| now.duration_since(e.stored_at) < self.ttl)
            .map(|e| e.value.clone())
    }
}

#[async_trait]
impl<L> AssignmentLookup for CachedAssignmentLookup<L>
where
    L: AssignmentLookup,
{
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError> {
        let now = Instant::now();
        if let Some(hit) = self.fresh(account, now) {
            debug!(account = %account, "assignment cache hit");
            return Ok(hit);
        }

        let value = self.inner.find_active_assignment(account).await?;
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, e| now.duration_since(e.stored_at) < self.ttl);
            entries.insert(
                account,
                CacheEntry {
                    value: value.clone(),
                    stored_at: now,
                },
            );
        }
        Ok(value)
    }
}
