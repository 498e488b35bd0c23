//! `tenantfence-auth` — identity and credential boundary.
//!
//! Decoupled from HTTP and storage: the types here describe who is calling
//! and what was bound to their session, never how those facts were stored.

pub mod account;
pub mod binding;
pub mod claims;
pub mod jwt;
pub mod principal;

pub use account::Account;
pub use binding::{BindingClass, ScopeBinding};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtError, JwtValidator};
pub use principal::{PrincipalId, Role};
