use core::str::FromStr;

use axum::{Json, extract::rejection::JsonRejection, response::Response};

use facturas_auth::{CommandAuthorization, Permission};

use crate::app::errors;
use crate::context::{PrincipalContext, TenantContext};

/// The permissions a single request needs.
pub struct Requires(pub Vec<Permission>);

impl CommandAuthorization for Requires {
    fn required_permissions(&self) -> &[Permission] {
        &self.0
    }
}

/// Authorize the caller for `perm` or produce the 403 response.
pub fn guard(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    perm: Permission,
) -> Result<(), Response> {
    crate::authz::authorize_command(tenant, principal, &Requires(vec![perm]))
        .map_err(errors::forbidden)
}

/// Parse a path id or produce the 400 response.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, Response> {
    raw.parse().map_err(|_| errors::invalid_id(what))
}

/// Unwrap a JSON body or produce the 400 response.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(v)| v).map_err(errors::invalid_body)
}
