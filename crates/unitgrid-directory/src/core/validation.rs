//! Enrollment claim validation
//!
//! Runs before any store access. A rejected claim never touches the unit
//! table, and the rejection reason only describes caller input, so it can
//! be returned to the caller verbatim.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use unitgrid_core::{CoreError, EnrollmentClaim, UnitPublicKey};

/// Maximum identity length in bytes
pub const MAX_IDENTITY_LEN: usize = 256;

/// Error returned when an enrollment claim is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("identity cannot be empty")]
    EmptyIdentity,

    #[error("identity too long (max 256 bytes)")]
    IdentityTooLong,

    #[error("identity contains invalid character {0:?}")]
    IdentityCharacter(char),

    #[error("invalid public key: {0}")]
    PublicKey(#[from] CoreError),

    #[error("identity must have the form <name>@<key fingerprint>")]
    MissingFingerprint,

    #[error("identity fingerprint does not match the supplied public key")]
    FingerprintMismatch,
}

/// How strictly an identity must be tied to the key it enrolls with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyBinding {
    /// Identity and key are checked independently
    #[default]
    None,
    /// Identity must be `<name>@<sha256 hex of the public key>`
    Fingerprint,
}

impl std::str::FromStr for KeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(KeyBinding::None),
            "fingerprint" => Ok(KeyBinding::Fingerprint),
            other => Err(format!("unknown key binding '{}'", other)),
        }
    }
}

/// Structural and semantic checks applied to every enrollment claim
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPolicy {
    pub key_binding: KeyBinding,
}

impl ValidationPolicy {
    pub fn new(key_binding: KeyBinding) -> Self {
        Self { key_binding }
    }

    /// Validate a claim, returning the parsed public key on success
    pub fn validate(&self, claim: &EnrollmentClaim) -> Result<UnitPublicKey, ValidationError> {
        let result = self.check(claim);
        if let Err(ref e) = result {
            warn!(
                identity = %claim.identity,
                address = %claim.address,
                reason = %e,
                "Rejected enrollment claim"
            );
        }
        result
    }

    fn check(&self, claim: &EnrollmentClaim) -> Result<UnitPublicKey, ValidationError> {
        validate_identity(&claim.identity)?;
        let key = UnitPublicKey::from_base64(&claim.public_key)?;

        if self.key_binding == KeyBinding::Fingerprint {
            let (_, fingerprint) = claim
                .identity
                .rsplit_once('@')
                .filter(|(name, fp)| !name.is_empty() && !fp.is_empty())
                .ok_or(ValidationError::MissingFingerprint)?;

            if !fingerprint.eq_ignore_ascii_case(&key.fingerprint()) {
                return Err(ValidationError::FingerprintMismatch);
            }
        }

        Ok(key)
    }
}

fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    if identity.is_empty() {
        return Err(ValidationError::EmptyIdentity);
    }
    if identity.len() > MAX_IDENTITY_LEN {
        return Err(ValidationError::IdentityTooLong);
    }
    if let Some(c) = identity.chars().find(|c| !is_identity_char(*c)) {
        return Err(ValidationError::IdentityCharacter(c));
    }
    Ok(())
}

fn is_identity_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '@' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use ed25519_dalek::SigningKey;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

    fn encoded_key() -> (String, UnitPublicKey) {
        let signing = SigningKey::from_bytes(&[42u8; 32]);
        let bytes = signing.verifying_key().to_bytes();
        (STANDARD.encode(bytes), UnitPublicKey::from_bytes(&bytes).unwrap())
    }

    fn claim(identity: &str, public_key: &str) -> EnrollmentClaim {
        EnrollmentClaim::new(identity, public_key, ADDR)
    }

    #[test]
    fn test_valid_claim() {
        let (pk, key) = encoded_key();
        let parsed = ValidationPolicy::default().validate(&claim("unit-123", &pk)).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_empty_identity() {
        let (pk, _) = encoded_key();
        let result = ValidationPolicy::default().validate(&claim("", &pk));
        assert_eq!(result.unwrap_err(), ValidationError::EmptyIdentity);
    }

    #[test]
    fn test_identity_too_long() {
        let (pk, _) = encoded_key();
        let long = "a".repeat(MAX_IDENTITY_LEN + 1);
        let result = ValidationPolicy::default().validate(&claim(&long, &pk));
        assert_eq!(result.unwrap_err(), ValidationError::IdentityTooLong);
    }

    #[test]
    fn test_identity_with_whitespace() {
        let (pk, _) = encoded_key();
        let result = ValidationPolicy::default().validate(&claim("unit 123", &pk));
        assert_eq!(result.unwrap_err(), ValidationError::IdentityCharacter(' '));

        let result = ValidationPolicy::default().validate(&claim("unit\n123", &pk));
        assert_eq!(result.unwrap_err(), ValidationError::IdentityCharacter('\n'));
    }

    #[test]
    fn test_missing_public_key() {
        let result = ValidationPolicy::default().validate(&claim("unit-123", ""));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::PublicKey(CoreError::MissingKey)
        );
    }

    #[test]
    fn test_malformed_public_key() {
        let result = ValidationPolicy::default().validate(&claim("unit-123", "PK1"));
        assert!(matches!(result, Err(ValidationError::PublicKey(_))));

        let short = STANDARD.encode([9u8; 31]);
        let result = ValidationPolicy::default().validate(&claim("unit-123", &short));
        assert!(matches!(
            result,
            Err(ValidationError::PublicKey(CoreError::KeyLength { .. }))
        ));
    }

    #[test]
    fn test_fingerprint_binding() {
        let (pk, key) = encoded_key();
        let policy = ValidationPolicy::new(KeyBinding::Fingerprint);

        let identity = format!("unit@{}", key.fingerprint());
        assert!(policy.validate(&claim(&identity, &pk)).is_ok());

        assert_eq!(
            policy.validate(&claim("unit-123", &pk)).unwrap_err(),
            ValidationError::MissingFingerprint
        );
        assert_eq!(
            policy.validate(&claim("@deadbeef", &pk)).unwrap_err(),
            ValidationError::MissingFingerprint
        );
        assert_eq!(
            policy.validate(&claim("unit@deadbeef", &pk)).unwrap_err(),
            ValidationError::FingerprintMismatch
        );
    }

    proptest! {
        #[test]
        fn prop_well_formed_identities_accepted(identity in "[A-Za-z0-9._:@-]{1,256}") {
            let (pk, _) = encoded_key();
            prop_assert!(ValidationPolicy::default().validate(&claim(&identity, &pk)).is_ok());
        }

        #[test]
        fn prop_whitespace_identities_rejected(
            head in "[a-z0-9]{0,16}",
            tail in "[a-z0-9]{0,16}",
            ws in "[ \t\r\n]",
        ) {
            let (pk, _) = encoded_key();
            let identity = format!("{}{}{}", head, ws, tail);
            let result = ValidationPolicy::default().validate(&claim(&identity, &pk));
            prop_assert!(
                matches!(result, Err(ValidationError::IdentityCharacter(_))),
                "unexpected result for {:?}: {:?}",
                identity,
                result
            );
        }
    }

    #[test]
    fn test_key_binding_parse() {
        assert_eq!("none".parse::<KeyBinding>().unwrap(), KeyBinding::None);
        assert_eq!("Fingerprint".parse::<KeyBinding>().unwrap(), KeyBinding::Fingerprint);
        assert!("strict".parse::<KeyBinding>().is_err());
    }
}
