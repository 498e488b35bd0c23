use serde::{Deserialize, Serialize};

use crate::PartitionId;

/// A tenant-scoped subset of the data plane.
///
/// Owned by the data-access subsystem; this workspace only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub id: PartitionId,
    pub code: String,
    pub token: String,
    pub locale: String,
    pub currency: String,
    /// Marks the shared/unscoped partition restricted accounts must never get.
    pub is_default: bool,
}

