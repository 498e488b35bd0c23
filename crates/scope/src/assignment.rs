use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenantfence_core::{AccountId, PartitionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

impl AssignmentStatus {
    /// Parse the status column used by assignment stores (`active`/`inactive`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// External record binding an account to its partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantAssignment {
    pub account_id: AccountId,
    pub partition_id: PartitionId,
    pub status: AssignmentStatus,
    pub updated_at: DateTime<Utc>,
}

impl TenantAssignment {
    pub fn active(account_id: AccountId, partition_id: PartitionId, updated_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            partition_id,
            status: AssignmentStatus::Active,
            updated_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }

    /// Ordering key used to pick the authoritative row among several active
    /// ones: most recently updated first, then the higher partition id.
    pub fn precedence(&self) -> (DateTime<Utc>, PartitionId) {
        (self.updated_at, self.partition_id)
    }
}
