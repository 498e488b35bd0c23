//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: isolation services and the stores behind them
//! - `routes/`: HTTP handlers
//! - `dto.rs`: response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use tenantfence_auth::{Hs256JwtIssuer, Hs256JwtValidator};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Auth runs first and attaches the framework scope; scope enforcement runs
/// second and replaces it, so handlers only ever see the enforced value.
pub fn build_app(jwt_secret: String, services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(jwt_secret.as_bytes())),
        services: services.clone(),
    };
    let issuer = Arc::new(Hs256JwtIssuer::new(jwt_secret.as_bytes()));

    let scoped = routes::router()
        .layer(Extension(services.clone()))
        .layer(Extension(issuer))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::auth_middleware,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    services,
                    middleware::scope_middleware,
                )),
        );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(scoped)
}
