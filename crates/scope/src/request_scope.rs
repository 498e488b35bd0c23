//! The per-request binding every downstream data access reads.
//!
//! `RequestScope` is an immutable value. Enforcement never edits it in
//! place: it produces a replacement which the transport layer swaps into the
//! request's scope slot before any handler runs, so no reader can observe a
//! half-updated scope.

use serde::Serialize;

use tenantfence_auth::{BindingClass, PrincipalId, Role, ScopeBinding};
use tenantfence_core::{Partition, PartitionId};

use crate::{ForbiddenReason, ScopeResolution};

/// How the current partition came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionAccess {
    /// Whatever the outer framework assigned; not touched by enforcement.
    #[default]
    Framework,
    /// Rewritten by enforcement to the principal's assigned partition.
    Confined,
    /// Enforcement found no accessible partition; reads must come back empty.
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestScope {
    principal: Option<PrincipalId>,
    current_partition: Option<Partition>,
    roles: Vec<Role>,
    session: Option<ScopeBinding>,
    language: Option<String>,
    access: PartitionAccess,
}

impl RequestScope {
    /// Scope for traffic with no attached principal.
    pub fn anonymous(partition: Option<Partition>) -> Self {
        Self {
            current_partition: partition,
            ..Self::default()
        }
    }

    pub fn for_principal(principal: PrincipalId, partition: Option<Partition>) -> Self {
        Self {
            principal: Some(principal),
            current_partition: partition,
            ..Self::default()
        }
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_session(mut self, session: Option<ScopeBinding>) -> Self {
        self.session = session;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn principal(&self) -> Option<PrincipalId> {
        self.principal
    }

    /// The partition currently in the slot, regardless of access state.
    pub fn current_partition(&self) -> Option<&Partition> {
        self.current_partition.as_ref()
    }

    pub fn partition_id(&self) -> Option<PartitionId> {
        self.current_partition.as_ref().map(|p| p.id)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn session(&self) -> Option<&ScopeBinding> {
        self.session.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn access(&self) -> PartitionAccess {
        self.access
    }

    pub fn is_denied(&self) -> bool {
        self.access == PartitionAccess::Denied
    }

    /// Partition downstream reads filter by. `None` means "no data".
    pub fn effective_partition(&self) -> Option<&Partition> {
        match self.access {
            PartitionAccess::Denied => None,
            _ => self.current_partition.as_ref(),
        }
    }

    /// The restriction this scope already records, used when a fresh
    /// resolution cannot be made and the policy is fail-open.
    ///
    /// A denied scope or a forbidden binding stays forbidden. A confined
    /// scope, or a restricted binding matching the slot, stays on its
    /// partition; a restricted binding naming another partition is
    /// forbidden rather than widened. Anything else is unrestricted.
    pub fn last_known_resolution(&self, reason: ForbiddenReason) -> ScopeResolution {
        if self.is_denied() {
            return ScopeResolution::Forbidden(reason);
        }

        match self.session.map(|binding| binding.class) {
            Some(BindingClass::Forbidden) => ScopeResolution::Forbidden(reason),
            Some(BindingClass::Restricted { partition_id }) => match &self.current_partition {
                Some(partition) if partition.id == partition_id && !partition.is_default => {
                    ScopeResolution::RestrictedTo(partition.clone())
                }
                _ => ScopeResolution::Forbidden(reason),
            },
            Some(BindingClass::Unrestricted) | None => match &self.current_partition {
                Some(partition) if self.access == PartitionAccess::Confined => {
                    ScopeResolution::RestrictedTo(partition.clone())
                }
                _ => ScopeResolution::Unrestricted,
            },
        }
    }

    /// Replacement scope confined to `partition`; every other field is kept.
    pub fn confined_to(&self, partition: Partition) -> Self {
        Self {
            current_partition: Some(partition),
            access: PartitionAccess::Confined,
            ..self.clone()
        }
    }

    /// Replacement scope with no accessible partition; every other field is kept.
    pub fn denied(&self) -> Self {
        Self {
            current_partition: None,
            access: PartitionAccess::Denied,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::fixtures::{DEFAULT, EIGHT, SEVEN, partition};

    fn populated() -> RequestScope {
        RequestScope::for_principal(PrincipalId::new(), Some(partition(DEFAULT, true)))
            .with_roles(vec![Role::new("operator")])
            .with_session(Some(ScopeBinding::new(BindingClass::Unrestricted, Utc::now())))
            .with_language(Some("de_DE".to_string()))
    }

    #[test]
    fn confining_preserves_every_other_field() {
        let original = populated();
        let confined = original.confined_to(partition(SEVEN, false));

        assert_eq!(confined.partition_id(), Some(SEVEN));
        assert_eq!(confined.access(), PartitionAccess::Confined);
        assert_eq!(confined.principal(), original.principal());
        assert_eq!(confined.roles(), original.roles());
        assert_eq!(confined.session(), original.session());
        assert_eq!(confined.language(), Some("de_DE"));
        // The original value is untouched.
        assert_eq!(original.partition_id(), Some(DEFAULT));
    }

    #[test]
    fn denied_scope_exposes_no_partition() {
        let denied = populated().denied();
        assert!(denied.is_denied());
        assert!(denied.effective_partition().is_none());
        assert!(denied.current_partition().is_none());
        assert_eq!(denied.roles(), &[Role::new("operator")]);
    }

    #[test]
    fn known_restrictions_survive_an_outage() {
        let reason = ForbiddenReason::LookupUnavailable;
        let principal = PrincipalId::new();
        let now = Utc::now();

        let denied = RequestScope::for_principal(principal, Some(partition(SEVEN, false))).denied();
        assert_eq!(denied.last_known_resolution(reason), ScopeResolution::Forbidden(reason));

        let confined = RequestScope::for_principal(principal, Some(partition(DEFAULT, true)))
            .confined_to(partition(SEVEN, false));
        assert_eq!(
            confined.last_known_resolution(reason),
            ScopeResolution::RestrictedTo(partition(SEVEN, false))
        );

        let bound = |class, slot| {
            RequestScope::for_principal(principal, Some(slot))
                .with_session(Some(ScopeBinding::new(class, now)))
        };
        let seven = BindingClass::Restricted { partition_id: SEVEN };
        assert_eq!(
            bound(seven, partition(SEVEN, false)).last_known_resolution(reason),
            ScopeResolution::RestrictedTo(partition(SEVEN, false))
        );
        assert_eq!(
            bound(seven, partition(EIGHT, false)).last_known_resolution(reason),
            ScopeResolution::Forbidden(reason)
        );
        assert_eq!(
            bound(BindingClass::Forbidden, partition(DEFAULT, true)).last_known_resolution(reason),
            ScopeResolution::Forbidden(reason)
        );
    }

    #[test]
    fn framework_scope_without_history_fails_open() {
        let scope = populated();
        assert_eq!(
            scope.last_known_resolution(ForbiddenReason::LookupUnavailable),
            ScopeResolution::Unrestricted
        );
    }
}
