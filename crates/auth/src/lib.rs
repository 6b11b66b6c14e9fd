//! `facturas-auth`: authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage: verifies bearer tokens, resolves the
//! principal's single company and answers permission checks.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use principal::{CompanyMembership, PrincipalId};
pub use roles::Role;
