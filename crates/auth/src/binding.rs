//! Scope outcome bound into session credentials at login.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use tenantfence_core::PartitionId;

/// Isolation class recorded for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum BindingClass {
    Unrestricted,
    Restricted { partition_id: PartitionId },
    Forbidden,
}

/// Resolution outcome persisted in credential material.
///
/// Only a hint: a stale or divergent binding never overrides a fresh
/// resolution for listing or forbidding decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeBinding {
    pub class: BindingClass,
    pub bound_at: DateTime<Utc>,
}

impl ScopeBinding {
    pub fn new(class: BindingClass, bound_at: DateTime<Utc>) -> Self {
        Self { class, bound_at }
    }

    /// True while `now` is within `ttl` of the binding time.
    ///
    /// Bindings from the future are treated as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.bound_at && now - self.bound_at < ttl
    }

    /// The partition this session was confined to, if any.
    pub fn restricted_partition(&self) -> Option<PartitionId> {
        match self.class {
            BindingClass::Restricted { partition_id } => Some(partition_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_window_is_half_open() {
        let bound_at = Utc::now();
        let binding = ScopeBinding::new(BindingClass::Forbidden, bound_at);
        let ttl = Duration::seconds(60);

        assert!(binding.is_fresh(bound_at, ttl));
        assert!(binding.is_fresh(bound_at + Duration::seconds(59), ttl));
        assert!(!binding.is_fresh(bound_at + Duration::seconds(60), ttl));
        assert!(!binding.is_fresh(bound_at - Duration::seconds(1), ttl));
    }

    #[test]
    fn restricted_class_serializes_with_tag() {
        let binding = ScopeBinding::new(
            BindingClass::Restricted { partition_id: PartitionId::new(7) },
            Utc::now(),
        );
        let json = serde_json::to_value(binding).unwrap();
        assert_eq!(json["class"]["class"], "restricted");
        assert_eq!(json["class"]["partition_id"], 7);
        assert_eq!(binding.restricted_partition(), Some(PartitionId::new(7)));
    }
}
