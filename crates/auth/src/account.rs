use serde::{Deserialize, Serialize};

use tenantfence_core::AccountId;

use crate::PrincipalId;

/// Internal administrative record bound to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Back-reference to the principal this account belongs to.
    pub principal_id: PrincipalId,
    /// Contact identifier (usually an email address).
    pub contact: String,
}
