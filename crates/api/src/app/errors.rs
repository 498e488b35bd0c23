use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tenantfence_scope::ScopeError;

pub fn scope_error_to_response(err: ScopeError) -> axum::response::Response {
    match err {
        ScopeError::DefaultPartitionUnavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "default_partition_unavailable",
            err.to_string(),
        ),
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
