use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use devmart_purchasing::PurchaseError;
use devmart_store::StoreError;

pub fn purchase_error_to_response(err: PurchaseError) -> axum::response::Response {
    match &err {
        PurchaseError::Validation { .. } => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        PurchaseError::AuthenticationRequired => json_error(
            StatusCode::UNAUTHORIZED,
            "authentication_required",
            err.to_string(),
        ),
        PurchaseError::PurchaseRecord(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "purchase_record_error",
            err.to_string(),
        ),
        PurchaseError::InvalidState { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_state", err.to_string())
        }
        PurchaseError::DownloadLimitExhausted { .. } => json_error(
            StatusCode::FORBIDDEN,
            "download_limit_exhausted",
            err.to_string(),
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match &err {
        StoreError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", err.to_string())
        }
        StoreError::Transport(_) | StoreError::Decode(_) | StoreError::UnsupportedRpc(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
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

pub fn forbidden() -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required")
}

pub fn not_found(what: &str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}
