//! Isolation services and the stores behind them.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use tenantfence_core::{Partition, PartitionId};
use tenantfence_infra::{
    CachedAssignmentLookup, InMemoryAssignmentStore, InMemoryIdentityStore,
    InMemoryPartitionDirectory, PgAssignmentLookup, PgIdentityResolver, PgPartitionDirectory,
};
use tenantfence_scope::{
    AssignmentLookup, IdentityResolver, LoginBinder, PartitionDirectory, PartitionVisibility,
    ScopeConfig, ScopeEnforcer, ScopeResolver,
};

use crate::config::AppConfig;

/// Everything handlers and middleware need, all sharing one resolver.
pub struct AppServices {
    pub directory: Arc<dyn PartitionDirectory>,
    pub enforcer: ScopeEnforcer,
    pub visibility: PartitionVisibility,
    pub binder: LoginBinder,
    pub config: ScopeConfig,
}

impl AppServices {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        assignments: Arc<dyn AssignmentLookup>,
        directory: Arc<dyn PartitionDirectory>,
        config: ScopeConfig,
    ) -> Self {
        let resolver = Arc::new(ScopeResolver::new(
            identity,
            assignments,
            directory.clone(),
            config.failure_policy,
        ));

        Self {
            directory,
            enforcer: ScopeEnforcer::new(resolver.clone(), config.binding_ttl),
            visibility: PartitionVisibility::new(resolver.clone()),
            binder: LoginBinder::new(resolver),
            config,
        }
    }
}

/// Handles to in-memory stores, kept so callers can seed and mutate them.
#[derive(Clone, Default)]
pub struct InMemoryPorts {
    pub identity: Arc<InMemoryIdentityStore>,
    pub assignments: Arc<InMemoryAssignmentStore>,
    pub directory: Arc<InMemoryPartitionDirectory>,
}

impl InMemoryPorts {
    /// A single default partition, no accounts: every caller is unrestricted.
    pub fn with_default_partition() -> Self {
        let ports = Self::default();
        ports.directory.upsert(Partition {
            id: PartitionId::new(1),
            code: "default".to_string(),
            token: "default".to_string(),
            locale: "en_US".to_string(),
            currency: "USD".to_string(),
            is_default: true,
        });
        ports
    }

    pub fn into_services(self, config: ScopeConfig, cache_ttl: std::time::Duration) -> AppServices {
        AppServices::new(
            self.identity,
            with_cache(self.assignments, cache_ttl),
            self.directory,
            config,
        )
    }
}

fn with_cache<L>(lookup: L, ttl: std::time::Duration) -> Arc<dyn AssignmentLookup>
where
    L: AssignmentLookup + 'static,
{
    if ttl.is_zero() {
        Arc::new(lookup)
    } else {
        tracing::info!(ttl_secs = ttl.as_secs(), "assignment cache enabled");
        Arc::new(CachedAssignmentLookup::new(lookup, ttl))
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores with only a default partition");
        return Ok(InMemoryPorts::with_default_partition()
            .into_services(config.scope, config.assignment_cache_ttl));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    Ok(AppServices::new(
        Arc::new(PgIdentityResolver::new(pool.clone())),
        with_cache(PgAssignmentLookup::new(pool.clone()), config.assignment_cache_ttl),
        Arc::new(PgPartitionDirectory::new(pool)),
        config.scope,
    ))
}
