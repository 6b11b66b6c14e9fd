use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use facturas_parties::{ClientChanges, ClientId, NewClient};

use crate::app::routes::common::{body, guard, parse_id};
use crate::app::{dto, errors, services::AppServices};
use crate::authz::{CLIENTS_READ, CLIENTS_WRITE};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).patch(update_client).delete(delete_client),
        )
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, CLIENTS_WRITE) {
        return resp;
    }
    let data = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.create_client(tenant.company_id(), data) {
        Ok(client) => (StatusCode::CREATED, Json(dto::client_to_json(&client))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, CLIENTS_READ) {
        return resp;
    }

    match services.list_clients(tenant.company_id()) {
        Ok(clients) => {
            let items: Vec<_> = clients.iter().map(dto::client_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, CLIENTS_READ) {
        return resp;
    }
    let id: ClientId = match parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_client(tenant.company_id(), id) {
        Ok(client) => (StatusCode::OK, Json(dto::client_to_json(&client))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<ClientChanges>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, CLIENTS_WRITE) {
        return resp;
    }
    let id: ClientId = match parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let changes = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_client(tenant.company_id(), id, changes) {
        Ok(client) => (StatusCode::OK, Json(dto::client_to_json(&client))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Rejected with 409 while any invoice references the client.
pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, CLIENTS_WRITE) {
        return resp;
    }
    let id: ClientId = match parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_client(tenant.company_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
