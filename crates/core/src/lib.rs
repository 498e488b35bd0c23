//! `tenantfence-core` — shared primitives for partition isolation.
//!
//! Pure data: identifiers, the read-only partition record and the domain
//! error type. No IO lives here.

pub mod error;
pub mod id;
pub mod partition;

pub use error::DomainError;
pub use id::{AccountId, PartitionId};
pub use partition::Partition;
