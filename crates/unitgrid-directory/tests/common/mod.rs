//! Shared test harness for directory integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use unitgrid_core::{JwtIssuer, TokenError, TokenIssuer, Unit};
use unitgrid_directory::{
    create_router, AppState, DirectoryConfig, Enrollment, MemoryStore, StorageError, UnitStore,
    ValidationPolicy,
};

pub const ENROLL_PATH: &str = "/api/v1/unit/enroll";
pub const TEST_SECRET: &str = "integration-test-secret";

/// Generate a fresh base64 Ed25519 public key
pub fn random_public_key() -> String {
    let signing = SigningKey::generate(&mut OsRng);
    STANDARD.encode(signing.verifying_key().to_bytes())
}

pub fn test_config() -> DirectoryConfig {
    DirectoryConfig {
        port: 0,
        token_secret: TEST_SECRET.into(),
        token_ttl_secs: 3600,
        key_binding: Default::default(),
        database_url: None,
    }
}

pub fn app_state(store: Arc<dyn UnitStore>, issuer: Arc<dyn TokenIssuer>) -> Arc<AppState> {
    Arc::new(AppState {
        enrollment: Enrollment::new(store, issuer, ValidationPolicy::default()),
        config: test_config(),
    })
}

pub fn jwt_issuer() -> Arc<JwtIssuer> {
    Arc::new(JwtIssuer::new(TEST_SECRET))
}

/// POST a raw body to the enroll endpoint as if it came from `peer`
pub async fn post_enroll(
    state: &Arc<AppState>,
    peer: &str,
    body: impl Into<Body>,
) -> (StatusCode, serde_json::Value) {
    let peer: SocketAddr = format!("{}:41000", peer).parse().expect("peer address");
    let app = create_router(state.clone()).layer(MockConnectInfo(peer));

    let request = Request::builder()
        .method("POST")
        .uri(ENROLL_PATH)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request");

    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// GET a probe endpoint
pub async fn get_json(state: &Arc<AppState>, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(path).body(Body::empty()).expect("request");
    let response = create_router(state.clone())
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

/// Enroll `identity` with `public_key` from `peer`
pub async fn enroll(
    state: &Arc<AppState>,
    peer: &str,
    identity: &str,
    public_key: &str,
) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "identity": identity, "public_key": public_key }).to_string();
    post_enroll(state, peer, body).await
}

// =============================================================================
// Fakes
// =============================================================================

/// Issuer that counts calls and can be switched into failure
#[derive(Default)]
pub struct FlakyIssuer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl TokenIssuer for FlakyIssuer {
    fn issue(&self, unit: &Unit) -> Result<String, TokenError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(TokenError::Signing("hsm offline at slot 7".into()));
        }
        Ok(format!("{}-T{}", unit.identity, n))
    }
}

/// Store wrapper with switchable faults
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_find: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_count: AtomicBool,
    /// Report the next lookup as a miss, as a concurrent creator would see it
    pub stale_next_find: AtomicBool,
    pub create_calls: AtomicUsize,
}

#[async_trait]
impl UnitStore for FaultyStore {
    async fn find_unit(&self, identity: &str) -> Result<Option<Unit>, StorageError> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("connection refused (10.9.9.9:5432)".into()));
        }
        if self.stale_next_find.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_unit(identity).await
    }

    async fn create_unit(&self, unit: Unit) -> Result<(), StorageError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create_unit(unit).await
    }

    async fn commit_issuance(
        &self,
        identity: &str,
        token: &str,
        address: &str,
        at: DateTime<Utc>,
    ) -> Result<Unit, StorageError> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(StorageError::Database("deadlock detected on units".into()));
        }
        self.inner.commit_issuance(identity, token, address, at).await
    }

    async fn count_units(&self) -> Result<usize, StorageError> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("connection refused (10.9.9.9:5432)".into()));
        }
        self.inner.count_units().await
    }
}
