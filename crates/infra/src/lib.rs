//! Infrastructure layer: adapters for the isolation ports.
//!
//! - `stores::in_memory`: dev/test implementations of identity, assignment
//!   and partition stores.
//! - `stores::postgres`: the same ports backed by PostgreSQL.
//! - `cache`: a TTL-bounded decorator for any assignment lookup.

pub mod cache;
pub mod stores;

pub use cache::CachedAssignmentLookup;
pub use stores::{
    InMemoryAssignmentStore, InMemoryIdentityStore, InMemoryPartitionDirectory,
    PgAssignmentLookup, PgIdentityResolver, PgPartitionDirectory,
};
