use tenantfence_auth::{JwtClaims, PrincipalId, Role};

/// Authenticated identity for a request (validated token claims).
///
/// Absent for anonymous traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    claims: JwtClaims,
}

impl PrincipalContext {
    pub fn new(claims: JwtClaims) -> Self {
        Self { claims }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.claims.sub
    }

    pub fn roles(&self) -> &[Role] {
        &self.claims.roles
    }

    pub fn claims(&self) -> &JwtClaims {
        &self.claims
    }
}
