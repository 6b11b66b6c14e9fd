//! Company administration.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::app::routes::common::guard;
use crate::app::{errors, services::AppServices};
use crate::authz::ADMIN_BOOTSTRAP;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new().route("/bootstrap", post(bootstrap))
}

/// Seed a demo client and product for the caller's company (idempotent).
pub async fn bootstrap(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, ADMIN_BOOTSTRAP) {
        return resp;
    }

    match services.bootstrap_company_defaults(tenant.company_id()) {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "client_id": report.client_id.map(|id| id.to_string()),
                "product_id": report.product_id.map(|id| id.to_string()),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
