use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use tenantfence_auth::{JwtClaims, JwtValidator};
use tenantfence_core::Partition;
use tenantfence_scope::RequestScope;

use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Header naming the partition (by code) the caller wants to work in.
pub const PARTITION_HEADER: &str = "x-partition";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub services: Arc<AppServices>,
}

/// Authenticates the caller (if a bearer token is present) and attaches the
/// initial, framework-assigned [`RequestScope`].
///
/// Missing credentials mean anonymous traffic; invalid credentials are a 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = match extract_bearer(req.headers())? {
        Some(token) => Some(
            state
                .jwt
                .validate(token, Utc::now())
                .map_err(|e| {
                    tracing::debug!(error = %e, "rejecting bearer token");
                    StatusCode::UNAUTHORIZED
                })?,
        ),
        None => None,
    };

    let partition = framework_partition(&state.services, claims.as_ref(), req.headers()).await;
    let language = preferred_language(req.headers());

    let scope = match &claims {
        Some(claims) => RequestScope::for_principal(claims.sub, partition)
            .with_roles(claims.roles.clone())
            .with_session(claims.scope),
        None => RequestScope::anonymous(partition),
    }
    .with_language(language);

    if let Some(claims) = claims {
        req.extensions_mut().insert(PrincipalContext::new(claims));
    }
    req.extensions_mut().insert(scope);

    Ok(next.run(req).await)
}

/// Replaces the request scope with its enforced version, once, before any
/// handler runs.
pub async fn scope_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(scope) = req.extensions().get::<RequestScope>().cloned() {
        let enforced = services.enforcer.enforce(&scope).await;
        req.extensions_mut().insert(enforced);
    }
    next.run(req).await
}

/// Partition the outer framework picks before isolation runs: the token's
/// selected partition, else the `x-partition` header, else the default.
async fn framework_partition(
    services: &AppServices,
    claims: Option<&JwtClaims>,
    headers: &HeaderMap,
) -> Option<Partition> {
    let directory = services.directory.as_ref();

    if let Some(id) = claims.and_then(|c| c.partition_id) {
        match directory.get_partition(id).await {
            Ok(Some(partition)) => return Some(partition),
            Ok(None) => tracing::debug!(partition = %id, "token names an unknown partition"),
            Err(err) => tracing::warn!(error = %err, "partition lookup failed"),
        }
    }

    if let Some(code) = headers.get(PARTITION_HEADER).and_then(|v| v.to_str().ok()) {
        match directory.list_partitions().await {
            Ok(partitions) => {
                if let Some(partition) = partitions.into_iter().find(|p| p.code == code.trim()) {
                    return Some(partition);
                }
            }
            Err(err) => tracing::warn!(error = %err, "partition listing failed"),
        }
    }

    match directory.default_partition().await {
        Ok(partition) => partition,
        Err(err) => {
            tracing::warn!(error = %err, "default partition lookup failed");
            None
        }
    }
}

fn preferred_language(headers: &HeaderMap) -> Option<String> {
    let header = headers
        .get(axum::http::header::ACCEPT_LANGUAGE)?
        .to_str()
        .ok()?;
    header
        .split(',')
        .next()
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim().to_string())
        .filter(|tag| !tag.is_empty() && tag != "*")
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
