//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and service construction
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services());
    build_app_with(jwt_secret, services)
}

/// Same router over caller-provided services.
pub fn build_app_with(jwt_secret: String, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(facturas_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a bearer token bound to one company.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/companies", post(routes::companies::register_company))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
