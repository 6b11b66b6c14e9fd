use facturas_auth::{PrincipalId, Role};
use facturas_core::CompanyId;

/// Tenant context for a request: the one company the caller acts for.
///
/// Immutable; present on every domain route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    company_id: CompanyId,
}

impl TenantContext {
    pub fn new(company_id: CompanyId) -> Self {
        Self { company_id }
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

/// Principal context for a request (authenticated identity + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
