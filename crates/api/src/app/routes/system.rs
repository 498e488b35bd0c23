use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use tenantfence_scope::RequestScope;

use crate::app::dto::WhoAmIResponse;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The enforced request scope as downstream handlers see it.
pub async fn whoami(Extension(scope): Extension<RequestScope>) -> impl IntoResponse {
    Json(WhoAmIResponse::from(&scope))
}
