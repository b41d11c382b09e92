//! Unit Enrollment Handler
//!
//! Units enroll by posting their identity and public key. The directory
//! resolves (or creates) the unit record, rotates its bearer token, records
//! the caller's address and returns the new token.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;
use unitgrid_core::EnrollmentClaim;

use crate::api::error::ApiError;
use crate::config::DirectoryConfig;
use crate::core::{Enrollment, EnrollmentError};

/// Application state shared across handlers
pub struct AppState {
    pub enrollment: Enrollment,
    pub config: DirectoryConfig,
}

/// Enrollment request body
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Identity claimed by the unit
    pub identity: String,

    /// Base64-encoded Ed25519 public key (32 bytes)
    pub public_key: String,
}

/// Enrollment response body
#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    /// Freshly issued bearer token
    pub token: String,
}

/// Enroll a unit
///
/// POST /api/v1/unit/enroll
///
/// The body is read and decoded here rather than through the `Json`
/// extractor so that every unreadable or malformed body, including one over
/// the body size limit, is reported as 422.
pub async fn enroll_unit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let address = peer.ip();

    let body = body.map_err(|e| {
        warn!(address = %address, error = %e, "Error while reading enrollment request");
        EnrollmentError::Decode(e.body_text())
    })?;

    let request: EnrollRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(address = %address, error = %e, "Error while reading enrollment request");
        EnrollmentError::Decode(e.to_string())
    })?;

    let claim = EnrollmentClaim::new(request.identity, request.public_key, address);
    let enrolled = state.enrollment.enroll(claim).await?;

    Ok(Json(EnrollResponse {
        token: enrolled.token,
    }))
}
