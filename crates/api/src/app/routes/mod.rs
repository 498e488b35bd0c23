use axum::{
    routing::{get, post},
    Router,
};

pub mod partitions;
pub mod session;
pub mod system;

/// Router for every endpoint that runs behind auth + scope enforcement.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/partitions", get(partitions::list))
        .route("/partitions/current", get(partitions::current))
        .route("/session/bind", post(session::bind))
}
