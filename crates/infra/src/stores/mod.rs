//! Port implementations for the externally owned records.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAssignmentStore, InMemoryIdentityStore, InMemoryPartitionDirectory};
pub use postgres::{PgAssignmentLookup, PgIdentityResolver, PgPartitionDirectory};
