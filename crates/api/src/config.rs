//! Environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use tenantfence_scope::{FailurePolicy, ScopeConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    /// Postgres connection string; in-memory stores when absent.
    pub database_url: Option<String>,
    pub scope: ScopeConfig,
    /// Zero disables assignment caching.
    pub assignment_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let failure_policy = match lookup("SCOPE_FAILURE_POLICY") {
            Some(value) => value
                .parse::<FailurePolicy>()
                .context("SCOPE_FAILURE_POLICY")?,
            None => FailurePolicy::default(),
        };

        let mut scope = ScopeConfig {
            failure_policy,
            ..ScopeConfig::default()
        };
        if let Some(secs) = parse_secs(&lookup, "SCOPE_BINDING_TTL_SECS")? {
            scope.binding_ttl = i64::try_from(secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .context("SCOPE_BINDING_TTL_SECS is out of range")?;
        }

        let assignment_cache_ttl = parse_secs(&lookup, "ASSIGNMENT_CACHE_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);

        Ok(Self {
            jwt_secret,
            bind_addr,
            database_url,
            scope,
            assignment_cache_ttl,
        })
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    lookup(key)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of seconds"))
        })
        .transpose()
}
