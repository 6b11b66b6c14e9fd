use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use facturas_auth::AuthzError;
use facturas_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::ItemsRejected(items) => {
            let message = format!("{} item(s) rejected", items.len());
            let items: Vec<_> = items
                .iter()
                .map(|e| json!({ "position": e.position, "message": e.error.to_string() }))
                .collect();
            (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": message,
                    "items": items,
                })),
            )
                .into_response()
        }
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        ServiceError::ReferentialIntegrity(msg) => {
            json_error(StatusCode::CONFLICT, "referential_integrity", msg)
        }
        ServiceError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        ServiceError::Unauthorized => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "unauthorized")
        }
        ServiceError::Store(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn forbidden(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "invalid_id",
        format!("invalid {what} id"),
    )
}

pub fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
