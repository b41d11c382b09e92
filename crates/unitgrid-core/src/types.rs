//! Common types shared by the directory and its clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A registered node in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Globally unique identity claimed by the unit (immutable)
    pub identity: String,

    /// Base64 Ed25519 key supplied at first enrollment (immutable)
    pub public_key: String,

    /// Last observed network origin of an enrollment call
    pub address: String,

    /// Current bearer credential, empty until the first issuance commits
    pub token: String,

    /// When the record was first created
    pub created_at: DateTime<Utc>,

    /// When the record was last mutated
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    /// Create a fresh record with an empty token
    pub fn new(
        identity: impl Into<String>,
        public_key: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            identity: identity.into(),
            public_key: public_key.into(),
            address: address.into(),
            token: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a credential has ever been committed for this unit
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// An enrollment attempt as received from the transport
///
/// `address` comes from the connection, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentClaim {
    pub identity: String,
    pub public_key: String,
    pub address: IpAddr,
}

impl EnrollmentClaim {
    pub fn new(identity: impl Into<String>, public_key: impl Into<String>, address: IpAddr) -> Self {
        Self {
            identity: identity.into(),
            public_key: public_key.into(),
            address,
        }
    }
}
