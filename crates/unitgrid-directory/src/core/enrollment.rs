//! Unit enrollment
//!
//! One enrollment runs strictly in order:
//!
//! `Validate -> Resolve -> IssueToken -> Persist`
//!
//! Each stage runs only if the previous one succeeded. A claim that fails
//! validation never reaches the store. A failed issuance leaves the unit
//! with its previous token. A failed commit means the caller gets no token,
//! because the durable record does not hold it.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use unitgrid_core::{EnrollmentClaim, TokenError, TokenIssuer, Unit};

use super::validation::{ValidationError, ValidationPolicy};
use crate::storage::{StorageError, UnitStore};

/// Why an enrollment did not produce a token
#[derive(Error, Debug)]
pub enum EnrollmentError {
    /// The request body could not be decoded
    #[error("malformed enrollment request: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage failure: {0}")]
    Store(#[from] StorageError),

    #[error("token issuance failure: {0}")]
    Token(#[from] TokenError),
}

impl EnrollmentError {
    /// Whether the failure was caused by caller input
    pub fn is_client_error(&self) -> bool {
        matches!(self, EnrollmentError::Decode(_) | EnrollmentError::Validation(_))
    }
}

/// Result of a successful enrollment
#[derive(Debug, Clone)]
pub struct Enrolled {
    /// The unit as committed, carrying the new token and address
    pub unit: Unit,
    pub token: String,
    /// Whether this enrollment created the unit
    pub created: bool,
}

/// Enrollment orchestrator
///
/// Holds no per-request state, so one instance serves all requests.
#[derive(Clone)]
pub struct Enrollment {
    store: Arc<dyn UnitStore>,
    issuer: Arc<dyn TokenIssuer>,
    policy: ValidationPolicy,
}

impl Enrollment {
    pub fn new(
        store: Arc<dyn UnitStore>,
        issuer: Arc<dyn TokenIssuer>,
        policy: ValidationPolicy,
    ) -> Self {
        Self { store, issuer, policy }
    }

    pub fn store(&self) -> &Arc<dyn UnitStore> {
        &self.store
    }

    /// Run one enrollment
    pub async fn enroll(&self, claim: EnrollmentClaim) -> Result<Enrolled, EnrollmentError> {
        let key = self.policy.validate(&claim)?;
        let address = claim.address.to_string();

        let resolved = self
            .store
            .resolve_or_create(&claim.identity, &key.to_base64(), &address)
            .await
            .map_err(|e| {
                error!(identity = %claim.identity, error = %e, "Error while resolving unit");
                e
            })?;

        let token = self.issuer.issue(&resolved.unit).map_err(|e| {
            error!(identity = %claim.identity, error = %e, "Error creating token");
            e
        })?;

        let unit = self
            .store
            .commit_issuance(&claim.identity, &token, &address, Utc::now())
            .await
            .map_err(|e| {
                error!(identity = %claim.identity, error = %e, "Error setting token");
                e
            })?;

        info!(
            identity = %unit.identity,
            address = %unit.address,
            created = resolved.created,
            "Unit enrolled"
        );

        Ok(Enrolled {
            unit,
            token,
            created: resolved.created,
        })
    }
}
