use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reqwest::StatusCode;

use tenantfence_api::app::{self, services::InMemoryPorts};
use tenantfence_auth::{Account, JwtClaims, PrincipalId};
use tenantfence_core::{AccountId, Partition, PartitionId};
use tenantfence_scope::{FailurePolicy, ScopeConfig, TenantAssignment};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    ports: InMemoryPorts,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(policy: FailurePolicy) -> Self {
        let ports = seeded_ports();
        let config = ScopeConfig {
            failure_policy: policy,
            ..ScopeConfig::default()
        };
        let services = Arc::new(ports.clone().into_services(config, StdDuration::ZERO));

        // Same router as prod, bound to an ephemeral port.
        let app = app::build_app(JWT_SECRET.to_string(), services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            ports,
            handle,
        }
    }

    fn account(&self, id: i64) -> PrincipalId {
        let principal = PrincipalId::new();
        self.ports.identity.insert(Account {
            id: AccountId::new(id),
            principal_id: principal,
            contact: format!("admin{id}@example.test"),
        });
        principal
    }

    fn assign(&self, account: i64, partition: i64) {
        self.ports.assignments.insert(TenantAssignment::active(
            AccountId::new(account),
            PartitionId::new(partition),
            Utc::now(),
        ));
    }

    async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = reqwest::Client::new().get(format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.unwrap()
    }

    async fn get_json(&self, path: &str, token: Option<&str>) -> serde_json::Value {
        let res = self.get(path, token).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn partition(id: i64, code: &str, is_default: bool) -> Partition {
    Partition {
        id: PartitionId::new(id),
        code: code.to_string(),
        token: format!("{code}-token"),
        locale: "en_US".to_string(),
        currency: "USD".to_string(),
        is_default,
    }
}

/// Partitions 1 (default), 3 (`apac`) and 7 (`emea`).
fn seeded_ports() -> InMemoryPorts {
    let ports = InMemoryPorts::default();
    ports.directory.upsert(partition(1, "default", true));
    ports.directory.upsert(partition(3, "apac", false));
    ports.directory.upsert(partition(7, "emea", false));
    ports
}

fn mint_jwt(principal: PrincipalId, partition_id: Option<i64>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: principal,
        roles: vec![],
        partition_id: partition_id.map(PartitionId::new),
        scope: None,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn decode_claims(token: &str) -> JwtClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &validation,
    )
    .expect("failed to decode jwt")
    .claims
}

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body["partitions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    assert_eq!(srv.get("/health", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_tokens_are_rejected() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let res = srv.get("/whoami", Some("not-a-jwt")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_traffic_is_not_restricted() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;

    let listed = srv.get_json("/partitions", None).await;
    assert_eq!(ids(&listed), vec![1, 3, 7]);

    let current = srv.get_json("/partitions/current", None).await;
    assert_eq!(current["source"], "scoped");
    assert_eq!(current["partition"]["id"], 1);
}

#[tokio::test]
async fn restricted_account_is_confined_everywhere() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = srv.account(42);
    srv.assign(42, 7);
    // The front end put the session on the default partition.
    let token = mint_jwt(principal, Some(1));

    let me = srv.get_json("/whoami", Some(&token)).await;
    assert_eq!(me["partition"]["id"], 7);
    assert_eq!(me["access"], "confined");

    let listed = srv.get_json("/partitions", Some(&token)).await;
    assert_eq!(ids(&listed), vec![7]);

    let current = srv.get_json("/partitions/current", Some(&token)).await;
    assert_eq!(current["source"], "assigned");
    assert_eq!(current["partition"]["id"], 7);
}

#[tokio::test]
async fn default_partition_assignment_sees_nothing() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = srv.account(42);
    srv.assign(42, 1);
    let token = mint_jwt(principal, None);

    let me = srv.get_json("/whoami", Some(&token)).await;
    assert_eq!(me["access"], "denied");
    assert!(me["partition"].is_null());

    let listed = srv.get_json("/partitions", Some(&token)).await;
    assert!(ids(&listed).is_empty());

    let current = srv.get_json("/partitions/current", Some(&token)).await;
    assert_eq!(current["source"], "no_access");
    assert!(current["partition"].is_null());
}

#[tokio::test]
async fn privileged_account_keeps_the_requested_partition() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = srv.account(99);
    let token = mint_jwt(principal, None);

    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .header("x-partition", "apac")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["partition"]["id"], 3);
    assert_eq!(me["access"], "framework");

    let listed = srv.get_json("/partitions", Some(&token)).await;
    assert_eq!(ids(&listed), vec![1, 3, 7]);
}

#[tokio::test]
async fn assignment_outage_follows_failure_policy() {
    let open = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = open.account(42);
    open.assign(42, 7);
    open.ports.assignments.set_unavailable(true);
    let token = mint_jwt(principal, Some(1));

    let me = open.get_json("/whoami", Some(&token)).await;
    assert_eq!(me["partition"]["id"], 1);
    assert_eq!(me["access"], "framework");

    let closed = TestServer::spawn(FailurePolicy::FailClosed).await;
    let principal = closed.account(42);
    closed.assign(42, 7);
    closed.ports.assignments.set_unavailable(true);
    let token = mint_jwt(principal, Some(1));

    let me = closed.get_json("/whoami", Some(&token)).await;
    assert_eq!(me["access"], "denied");
    let listed = closed.get_json("/partitions", Some(&token)).await;
    assert!(ids(&listed).is_empty());
}

#[tokio::test]
async fn missing_default_partition_is_a_hard_error() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    srv.ports.directory.remove(PartitionId::new(1));

    let res = srv.get("/partitions/current", None).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "default_partition_unavailable");
}

#[tokio::test]
async fn bound_session_token_starts_on_the_assigned_partition() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = srv.account(42);
    srv.assign(42, 7);
    let token = mint_jwt(principal, Some(1));

    let res = reqwest::Client::new()
        .post(format!("{}/session/bind", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: serde_json::Value = res.json().await.unwrap();
    assert_eq!(session["scope"]["class"]["class"], "restricted");
    assert_eq!(session["scope"]["class"]["partition_id"], 7);

    let bound = session["token"].as_str().unwrap().to_string();
    let me = srv.get_json("/whoami", Some(&bound)).await;
    assert_eq!(me["partition"]["id"], 7);
    assert_eq!(me["session"]["class"]["class"], "restricted");

    // Isolation decisions still follow the live assignment.
    srv.ports.assignments.clear_account(AccountId::new(42));
    srv.assign(42, 3);
    let listed = srv.get_json("/partitions", Some(&bound)).await;
    assert_eq!(ids(&listed), vec![3]);
    let me = srv.get_json("/whoami", Some(&bound)).await;
    assert_eq!(me["partition"]["id"], 3);

    // Moved onto the default partition: the still-fresh binding grants nothing.
    srv.ports.assignments.clear_account(AccountId::new(42));
    srv.assign(42, 1);
    let me = srv.get_json("/whoami", Some(&bound)).await;
    assert_eq!(me["access"], "denied");
    assert!(ids(&srv.get_json("/partitions", Some(&bound)).await).is_empty());
}

#[tokio::test]
async fn session_bind_does_not_extend_token_expiry() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let principal = srv.account(42);
    srv.assign(42, 7);
    let token = mint_jwt(principal, None);
    let original = decode_claims(&token);

    let res = reqwest::Client::new()
        .post(format!("{}/session/bind", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: serde_json::Value = res.json().await.unwrap();
    let rebound = decode_claims(session["token"].as_str().unwrap());

    assert_eq!(rebound.expires_at, original.expires_at);
    assert_eq!(rebound.partition_id, Some(PartitionId::new(7)));
}

#[tokio::test]
async fn anonymous_session_bind_is_unauthorized() {
    let srv = TestServer::spawn(FailurePolicy::FailOpen).await;
    let res = reqwest::Client::new()
        .post(format!("{}/session/bind", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
