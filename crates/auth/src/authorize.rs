use thiserror::Error;

use facturas_core::CompanyId;

use crate::{CompanyMembership, Permission, PrincipalId};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_company_id: CompanyId,
    pub membership: CompanyMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("company mismatch")]
    CompanyMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Permissions an operation requires, checked before it runs.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal within its active company. Pure policy check.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_company_id != principal.membership.company_id {
        return Err(AuthzError::CompanyMismatch);
    }

    let granted = principal
        .membership
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn principal(company: CompanyId, active: CompanyId, perms: &[&'static str]) -> Principal {
        Principal {
            principal_id: PrincipalId::new(),
            active_company_id: active,
            membership: CompanyMembership {
                company_id: company,
                roles: vec![Role::new("user")],
                permissions: perms.iter().map(|p| Permission::from_static(p)).collect(),
            },
        }
    }

    #[test]
    fn grants_listed_permission_only() {
        let company = CompanyId::new();
        let p = principal(company, company, &["invoices.read"]);
        assert_eq!(authorize(&p, &Permission::new("invoices.read")), Ok(()));
        assert_eq!(
            authorize(&p, &Permission::new("invoices.write")),
            Err(AuthzError::Forbidden("invoices.write".to_string()))
        );
    }

    #[test]
    fn wildcard_grants_everything() {
        let company = CompanyId::new();
        let p = principal(company, company, &["*"]);
        assert!(authorize(&p, &Permission::new("admin.bootstrap")).is_ok());
    }

    #[test]
    fn membership_must_match_active_company() {
        let p = principal(CompanyId::new(), CompanyId::new(), &["*"]);
        assert_eq!(
            authorize(&p, &Permission::new("clients.read")),
            Err(AuthzError::CompanyMismatch)
        );
    }
}
