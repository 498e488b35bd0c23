//! Partition read operations, shaped by the visibility filter.

use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use tenantfence_scope::RequestScope;

use crate::app::dto::{CurrentPartitionResponse, PartitionListResponse};
use crate::app::{errors, services::AppServices};

/// GET /partitions
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<RequestScope>,
) -> impl IntoResponse {
    let partitions = services.visibility.list_partitions(&scope).await;
    Json(PartitionListResponse { partitions })
}

/// GET /partitions/current
pub async fn current(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<RequestScope>,
) -> axum::response::Response {
    match services.visibility.current_partition(&scope).await {
        Ok(current) => Json(CurrentPartitionResponse::from(current)).into_response(),
        Err(err) => errors::scope_error_to_response(err),
    }
}
