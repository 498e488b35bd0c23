use core::str::FromStr;

use chrono::Duration;
use tenantfence_core::DomainError;

/// What the engine does when an external lookup fails.
///
/// `FailOpen` lets the request through unrestricted (availability first): a
/// tenant-assignment outage then grants a restricted account full
/// visibility for as long as it lasts. `FailClosed` forbids instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl FromStr for FailurePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "fail_open" | "open" => Ok(Self::FailOpen),
            "fail-closed" | "fail_closed" | "closed" => Ok(Self::FailClosed),
            other => Err(DomainError::invalid_id(format!(
                "unknown failure policy '{other}' (expected fail-open or fail-closed)"
            ))),
        }
    }
}

impl core::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FailOpen => f.write_str("fail-open"),
            Self::FailClosed => f.write_str("fail-closed"),
        }
    }
}

/// Tunables for the isolation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeConfig {
    pub failure_policy: FailurePolicy,
    /// How long a login-time binding may short-circuit enforcement.
    pub binding_ttl: Duration,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            binding_ttl: Duration::minutes(5),
        }
    }
}
