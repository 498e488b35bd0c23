//! Error taxonomy for scope resolution.
//!
//! Port errors never escape the engine: they are logged and mapped through
//! the configured [`crate::FailurePolicy`]. [`ScopeError`] is what callers
//! can actually see.

use thiserror::Error;

/// Tenant-assignment authority failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("tenant assignment authority unavailable: {0}")]
    Unavailable(String),

    #[error("malformed tenant assignment row: {0}")]
    Malformed(String),
}

/// Identity subsystem failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity subsystem unavailable: {0}")]
    Unavailable(String),

    #[error("malformed account record: {0}")]
    Malformed(String),
}

/// Data-access subsystem failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("partition directory unavailable: {0}")]
    Unavailable(String),

    #[error("malformed partition record: {0}")]
    Malformed(String),
}

/// Failures surfaced to callers of the visibility filter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Even the fallback default partition could not be located.
    #[error("default partition unavailable")]
    DefaultPartitionUnavailable,
}
