//! API module for the unit directory

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::core::KeyBinding;
use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<usize>,
    pub key_binding: KeyBinding,
    pub token_ttl_secs: i64,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
///
/// Returns 503 while the unit store is unreachable.
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadyResponse>) {
    let count = state.enrollment.store().count_units().await;
    let status = match count {
        Ok(_) => StatusCode::OK,
        Err(ref e) => {
            error!(error = %e, "Unit store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let body = ReadyResponse {
        ready: count.is_ok(),
        unit_count: count.ok(),
        key_binding: state.config.key_binding,
        token_ttl_secs: state.config.token_ttl_secs,
    };
    (status, Json(body))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Enrollment
        .route("/api/v1/unit/enroll", post(handlers::enroll_unit))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
