use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use retailforge_import::ImportError;
use retailforge_infra::{LoyaltyCardError, RepositoryError};

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        RepositoryError::Invalid(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        RepositoryError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}

pub fn import_error_to_response(err: ImportError) -> axum::response::Response {
    match err {
        ImportError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ImportError::Repository(e) => repository_error_to_response(e),
    }
}

pub fn loyalty_error_to_response(err: LoyaltyCardError) -> axum::response::Response {
    match err {
        LoyaltyCardError::Repository(e) => repository_error_to_response(e),
        LoyaltyCardError::Publish(msg) => json_error(StatusCode::BAD_GATEWAY, "publish_error", msg),
    }
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
