use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use facturas_parties::NewCompany;

use crate::app::routes::common::{body, guard};
use crate::app::{dto, errors, services::AppServices};
use crate::authz::{COMPANY_DELETE, COMPANY_READ};
use crate::context::{PrincipalContext, TenantContext};

/// Public registration of a new company (tenant).
pub async fn register_company(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewCompany>, JsonRejection>,
) -> Response {
    let data = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.register_company(data) {
        Ok(company) => (StatusCode::CREATED, Json(dto::company_to_json(&company))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn current_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, COMPANY_READ) {
        return resp;
    }

    match services.company(tenant.company_id()) {
        Ok(company) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Delete the caller's company and everything it owns.
pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, COMPANY_DELETE) {
        return resp;
    }

    match services.delete_company(tenant.company_id()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
