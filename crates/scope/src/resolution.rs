use serde::Serialize;

use tenantfence_auth::BindingClass;
use tenantfence_core::Partition;

/// Why a real account ended up with no accessible partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The assignment points at the shared default partition.
    DefaultPartitionAssigned,
    /// The assignment points at a partition that does not exist.
    PartitionNotFound,
    /// The assigned partition exists in the assignment but could not be read.
    PartitionUnavailable,
    /// The assignment authority failed under a fail-closed policy.
    LookupUnavailable,
    /// The identity subsystem failed under a fail-closed policy.
    IdentityUnavailable,
}

/// Outcome of resolving a principal's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeResolution {
    /// No isolation policy applies; every partition is visible.
    Unrestricted,
    /// Confined to exactly this partition (never the default one).
    RestrictedTo(Partition),
    /// A real account with no accessible partition at all.
    Forbidden(ForbiddenReason),
}

impl ScopeResolution {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Label used in logs and responses.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::RestrictedTo(_) => "restricted",
            Self::Forbidden(_) => "forbidden",
        }
    }

    /// The class persisted into session credentials.
    pub fn binding_class(&self) -> BindingClass {
        match self {
            Self::Unrestricted => BindingClass::Unrestricted,
            Self::RestrictedTo(p) => BindingClass::Restricted { partition_id: p.id },
            Self::Forbidden(_) => BindingClass::Forbidden,
        }
    }
}
