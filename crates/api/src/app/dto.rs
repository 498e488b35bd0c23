//! Response bodies.

use serde::Serialize;

use tenantfence_auth::ScopeBinding;
use tenantfence_core::Partition;
use tenantfence_scope::{CurrentPartition, PartitionAccess, RequestScope};

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub principal_id: Option<String>,
    pub roles: Vec<String>,
    pub partition: Option<Partition>,
    pub access: PartitionAccess,
    pub language: Option<String>,
    pub session: Option<ScopeBinding>,
}

impl From<&RequestScope> for WhoAmIResponse {
    fn from(scope: &RequestScope) -> Self {
        Self {
            principal_id: scope.principal().map(|p| p.to_string()),
            roles: scope.roles().iter().map(|r| r.as_str().to_string()).collect(),
            partition: scope.effective_partition().cloned(),
            access: scope.access(),
            language: scope.language().map(str::to_string),
            session: scope.session().copied(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PartitionListResponse {
    pub partitions: Vec<Partition>,
}

#[derive(Debug, Serialize)]
pub struct CurrentPartitionResponse {
    /// `assigned`, `scoped`, `default` or `no_access`.
    pub source: &'static str,
    pub partition: Option<Partition>,
}

impl From<CurrentPartition> for CurrentPartitionResponse {
    fn from(current: CurrentPartition) -> Self {
        let source = match &current {
            CurrentPartition::Assigned(_) => "assigned",
            CurrentPartition::Scoped(_) => "scoped",
            CurrentPartition::Default(_) => "default",
            CurrentPartition::NoAccess => "no_access",
        };
        Self {
            source,
            partition: current.into_partition(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub scope: Option<ScopeBinding>,
}
