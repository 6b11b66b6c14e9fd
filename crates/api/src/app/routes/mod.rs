use axum::{Router, routing::get};

pub mod admin;
pub mod clients;
pub mod common;
pub mod companies;
pub mod invoices;
pub mod products;
pub mod system;

/// Router for all authenticated (company-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route(
            "/company",
            get(companies::current_company).delete(companies::delete_company),
        )
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/invoices", invoices::router())
        .nest("/admin", admin::router())
}
