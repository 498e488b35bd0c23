//! `tenantfence-scope` — per-request partition isolation.
//!
//! One resolution engine decides, for a principal, whether it is confined to
//! a single partition, unrestricted, or forbidden. Every entry point (request
//! enforcement, partition listing, current-partition lookup, login binding)
//! goes through that engine so they cannot drift apart.
//!
//! External collaborators (identity, tenant assignments, partition data) are
//! reached only through the traits in [`ports`], injected at construction.

pub mod assignment;
pub mod binder;
pub mod config;
pub mod enforcement;
pub mod engine;
pub mod error;
pub mod ports;
pub mod request_scope;
pub mod resolution;
pub mod visibility;

#[cfg(test)]
mod fixtures;

pub use assignment::{AssignmentStatus, TenantAssignment};
pub use binder::LoginBinder;
pub use config::{FailurePolicy, ScopeConfig};
pub use enforcement::ScopeEnforcer;
pub use engine::ScopeResolver;
pub use error::{DirectoryError, IdentityError, LookupError, ScopeError};
pub use ports::{AssignmentLookup, IdentityResolver, PartitionDirectory};
pub use request_scope::{PartitionAccess, RequestScope};
pub use resolution::{ForbiddenReason, ScopeResolution};
pub use visibility::{CurrentPartition, PartitionVisibility};
