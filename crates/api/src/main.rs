use std::sync::Arc;

use anyhow::Context;

use tenantfence_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tenantfence_observability::init();

    let config = AppConfig::from_env()?;
    let services = Arc::new(app::services::build_services(&config).await?);
    let app = app::build_app(config.jwt_secret.clone(), services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        failure_policy = %config.scope.failure_policy,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
