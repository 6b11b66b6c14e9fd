//! API-side authorization guard.
//!
//! Checked in each handler before the service call; domain and infra code
//! stay auth-agnostic.

use facturas_auth::{
    AuthzError, CommandAuthorization, CompanyMembership, Permission, Principal, Role, authorize,
};

use crate::context::{PrincipalContext, TenantContext};

pub const CLIENTS_READ: Permission = Permission::from_static("clients.read");
pub const CLIENTS_WRITE: Permission = Permission::from_static("clients.write");
pub const PRODUCTS_READ: Permission = Permission::from_static("products.read");
pub const PRODUCTS_WRITE: Permission = Permission::from_static("products.write");
pub const INVOICES_READ: Permission = Permission::from_static("invoices.read");
pub const INVOICES_WRITE: Permission = Permission::from_static("invoices.write");
pub const COMPANY_READ: Permission = Permission::from_static("company.read");
pub const COMPANY_DELETE: Permission = Permission::from_static("company.delete");
pub const ADMIN_BOOTSTRAP: Permission = Permission::from_static("admin.bootstrap");

/// Check authorization for an operation in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let membership = CompanyMembership {
        company_id: tenant.company_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        active_company_id: tenant.company_id(),
        membership,
    };

    for perm in command.required_permissions() {
        authorize(&principal, perm)?;
    }

    Ok(())
}

/// Static role→permission policy.
///
/// "admin" grants everything within the company; "user" covers day-to-day
/// invoicing but not destructive company-level operations.
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r.as_str() == "admin") {
        return vec![Permission::new("*")];
    }

    if roles.iter().any(|r| r.as_str() == "user") {
        return vec![
            CLIENTS_READ,
            CLIENTS_WRITE,
            PRODUCTS_READ,
            PRODUCTS_WRITE,
            INVOICES_READ,
            INVOICES_WRITE,
            COMPANY_READ,
        ];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facturas_auth::PrincipalId;
    use facturas_core::CompanyId;

    struct Needs(Vec<Permission>);

    impl CommandAuthorization for Needs {
        fn required_permissions(&self) -> &[Permission] {
            &self.0
        }
    }

    fn check(role: &'static str, perm: Permission) -> Result<(), AuthzError> {
        let tenant = TenantContext::new(CompanyId::new());
        let principal = PrincipalContext::new(PrincipalId::new(), vec![Role::new(role)]);
        authorize_command(&tenant, &principal, &Needs(vec![perm]))
    }

    #[test]
    fn admin_may_do_anything() {
        assert!(check("admin", ADMIN_BOOTSTRAP).is_ok());
        assert!(check("admin", COMPANY_DELETE).is_ok());
    }

    #[test]
    fn user_may_invoice_but_not_bootstrap() {
        assert!(check("user", INVOICES_WRITE).is_ok());
        assert!(check("user", ADMIN_BOOTSTRAP).is_err());
    }

    #[test]
    fn unknown_role_gets_nothing() {
        assert_eq!(
            check("guest", CLIENTS_READ),
            Err(AuthzError::Forbidden("clients.read".to_string()))
        );
    }
}
