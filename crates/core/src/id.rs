//! Strongly-typed identifiers for externally owned records.
//!
//! Partitions and accounts are rows in stores this workspace does not own,
//! so their identifiers are the stores' integer keys.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a partition (the tenant isolation unit).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(i64);

/// Identifier of an administrative account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

macro_rules! impl_row_id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_row_id_newtype!(PartitionId, "PartitionId");
impl_row_id_newtype!(AccountId, "AccountId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integers() {
        assert_eq!("  7 ".parse::<PartitionId>().unwrap(), PartitionId::new(7));
        assert_eq!("42".parse::<AccountId>().unwrap().get(), 42);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<PartitionId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.starts_with("PartitionId")));
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&AccountId::new(99)).unwrap();
        assert_eq!(json, "99");
    }
}
