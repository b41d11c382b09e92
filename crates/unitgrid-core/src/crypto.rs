//! Unit key material
//!
//! Units enroll with an Ed25519 verifying key, carried on the wire as
//! standard base64 of the 32 raw key bytes. The key fingerprint (lowercase
//! hex SHA-256 of the raw bytes) is what an identity of the form
//! `name@fingerprint` refers to.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{VerifyingKey, PUBLIC_KEY_LENGTH};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};

/// A unit's parsed Ed25519 public key
#[derive(Clone, PartialEq, Eq)]
pub struct UnitPublicKey {
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for UnitPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitPublicKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl UnitPublicKey {
    /// Parse a key from its base64 wire encoding
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CoreError::MissingKey);
        }

        let bytes = STANDARD.decode(encoded)?;
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(CoreError::KeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            });
        }

        let mut raw = [0u8; PUBLIC_KEY_LENGTH];
        raw.copy_from_slice(&bytes);
        Self::from_bytes(&raw)
    }

    /// Create a key from raw bytes
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)?;
        Ok(Self { verifying_key })
    }

    /// Get the raw key bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Base64 wire encoding
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Lowercase hex SHA-256 of the raw key bytes
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.to_bytes()))
    }
}
