use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};

use facturas_invoicing::{
    InvoiceChanges, InvoiceDraft, InvoiceId, LineItemChanges, LineItemDraft, LineItemId,
};

use crate::app::routes::common::{body, guard, parse_id};
use crate::app::{dto, errors, services::AppServices};
use crate::authz::{INVOICES_READ, INVOICES_WRITE};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice).get(list_invoices))
        .route(
            "/:id",
            get(get_invoice).patch(update_invoice).delete(delete_invoice),
        )
        .route("/:id/items", post(add_line_item))
        .route(
            "/:id/items/:item_id",
            patch(update_line_item).delete(delete_line_item),
        )
        .route("/:id/recalculate", post(recalculate))
}

/// Create an invoice with its items in one go.
///
/// Per-item failures come back as `items: [{position, message}]`.
pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<InvoiceDraft>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let draft = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.create_invoice(tenant.company_id(), draft) {
        Ok(detail) => {
            (StatusCode::CREATED, Json(dto::invoice_detail_to_json(&detail))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_READ) {
        return resp;
    }

    match services.list_invoices(tenant.company_id()) {
        Ok(invoices) => {
            let items: Vec<_> = invoices.iter().map(dto::invoice_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_READ) {
        return resp;
    }
    let id: InvoiceId = match parse_id(&id, "invoice") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_invoice(tenant.company_id(), id) {
        Ok(detail) => (StatusCode::OK, Json(dto::invoice_detail_to_json(&detail))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<InvoiceChanges>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let id: InvoiceId = match parse_id(&id, "invoice") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let changes = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_invoice(tenant.company_id(), id, changes) {
        Ok(invoice) => (StatusCode::OK, Json(dto::invoice_to_json(&invoice))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let id: InvoiceId = match parse_id(&id, "invoice") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_invoice(tenant.company_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<LineItemDraft>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let id: InvoiceId = match parse_id(&id, "invoice") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let draft = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.admit_line_item(tenant.company_id(), id, draft) {
        Ok(item) => (StatusCode::CREATED, Json(dto::line_item_to_json(&item))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, item_id)): Path<(String, String)>,
    payload: Result<Json<LineItemChanges>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let (id, item_id): (InvoiceId, LineItemId) =
        match (parse_id(&id, "invoice"), parse_id(&item_id, "line item")) {
            (Ok(id), Ok(item_id)) => (id, item_id),
            (Err(resp), _) | (_, Err(resp)) => return resp,
        };
    let changes = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_line_item(tenant.company_id(), id, item_id, changes) {
        Ok(item) => (StatusCode::OK, Json(dto::line_item_to_json(&item))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Returns the invoice's refreshed totals.
pub async fn delete_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, item_id)): Path<(String, String)>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let (id, item_id): (InvoiceId, LineItemId) =
        match (parse_id(&id, "invoice"), parse_id(&item_id, "line item")) {
            (Ok(id), Ok(item_id)) => (id, item_id),
            (Err(resp), _) | (_, Err(resp)) => return resp,
        };

    match services.delete_line_item(tenant.company_id(), id, item_id) {
        Ok(totals) => (StatusCode::OK, Json(dto::totals_to_json(totals))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn recalculate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, INVOICES_WRITE) {
        return resp;
    }
    let id: InvoiceId = match parse_id(&id, "invoice") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.recalculate_invoice_totals(tenant.company_id(), id) {
        Ok(totals) => (StatusCode::OK, Json(dto::totals_to_json(totals))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
