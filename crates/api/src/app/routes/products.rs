use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use facturas_products::{NewProduct, ProductChanges, ProductId};

use crate::app::routes::common::{body, guard, parse_id};
use crate::app::{dto, errors, services::AppServices};
use crate::authz::{PRODUCTS_READ, PRODUCTS_WRITE};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, PRODUCTS_WRITE) {
        return resp;
    }
    let data = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.create_product(tenant.company_id(), data) {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, PRODUCTS_READ) {
        return resp;
    }

    match services.list_products(tenant.company_id()) {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, PRODUCTS_READ) {
        return resp;
    }
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_product(tenant.company_id(), id) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Issued line items keep the price and VAT they were admitted with.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<ProductChanges>, JsonRejection>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, PRODUCTS_WRITE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let changes = match body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_product(tenant.company_id(), id, changes) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Rejected with 409 while any line item references the product.
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = guard(&tenant, &principal, PRODUCTS_WRITE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_product(tenant.company_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
