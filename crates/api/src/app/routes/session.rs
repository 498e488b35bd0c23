//! Login-time scope binding.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use tenantfence_auth::Hs256JwtIssuer;

use crate::app::dto::SessionResponse;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// POST /session/bind
///
/// Re-issues the caller's token with its resolved scope bound in, so later
/// requests can skip the assignment lookup while the binding is fresh.
pub async fn bind(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(issuer): Extension<Arc<Hs256JwtIssuer>>,
    principal: Option<Extension<PrincipalContext>>,
) -> axum::response::Response {
    let Some(Extension(principal)) = principal else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "a bearer token is required to bind a session",
        );
    };

    let claims = services.binder.bind_claims(principal.claims(), Utc::now()).await;
    match issuer.issue(&claims) {
        Ok(token) => (
            StatusCode::OK,
            Json(SessionResponse {
                token,
                scope: claims.scope,
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to issue session token");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", err.to_string())
        }
    }
}
